//! Handlers for the `/admin` resource (user management).
//!
//! All handlers require a global principal via [`RequireGlobal`].

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ecoenergy_core::roles::Role;
use ecoenergy_core::types::{DbId, Timestamp};
use ecoenergy_core::validation::{
    ensure_valid, field_violations, name_violations, password_violations, MAX_USERNAME_LENGTH,
};
use ecoenergy_db::models::profile::{CreateProfile, Profile};
use ecoenergy_db::models::user::{CreateUser, UpdateUser, User};
use ecoenergy_db::repositories::{ProfileRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireGlobal;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub organization_id: Option<DbId>,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Request body for `PUT /admin/users/{id}`.
///
/// `organization_id` moves the user to another tenant; set
/// `detach_organization` to remove the assignment instead.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<Role>,
    pub organization_id: Option<DbId>,
    #[serde(default)]
    pub detach_organization: bool,
}

/// A user with their profile assignment, as seen by administrators.
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
    pub is_active: bool,
    pub role: Role,
    pub organization_id: Option<DbId>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireGlobal(admin): RequireGlobal,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AdminUserResponse>>)> {
    let mut violations = field_violations(&input);
    violations.extend(name_violations(&input.username, "username", MAX_USERNAME_LENGTH));
    violations.extend(password_violations(&input.password, "password"));
    ensure_valid(violations)?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let mut tx = state.pool.begin().await?;
    let user = UserRepo::create(
        &mut *tx,
        &CreateUser {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            password_hash: hashed,
            is_superuser: input.is_superuser,
        },
    )
    .await?;
    let profile = ProfileRepo::create(
        &mut *tx,
        &CreateProfile {
            user_id: user.id,
            phone: String::new(),
            role: input.role,
            organization_id: input.organization_id,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id = user.id,
        role = %profile.role,
        organization_id = ?profile.organization_id,
        "User created",
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(build_user_response(&user, Some(&profile)))),
    ))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireGlobal(_admin): RequireGlobal,
) -> AppResult<Json<DataResponse<Vec<AdminUserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;

    // One query for every profile instead of one per user.
    let ids: Vec<DbId> = users.iter().map(|u| u.id).collect();
    let profiles: HashMap<DbId, Profile> = ProfileRepo::list_for_users(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|p| (p.user_id, p))
        .collect();

    let responses = users
        .iter()
        .map(|u| build_user_response(u, profiles.get(&u.id)))
        .collect();
    Ok(Json(DataResponse::new(responses)))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireGlobal(_admin): RequireGlobal,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AdminUserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;
    let profile = ProfileRepo::find_by_user_id(&state.pool, id).await?;
    Ok(Json(DataResponse::new(build_user_response(
        &user,
        profile.as_ref(),
    ))))
}

/// PUT /api/v1/admin/users/{id}
///
/// Updates account fields and the role/organization assignment. The user's
/// access token keeps the old assignment until it is refreshed.
pub async fn update_user(
    State(state): State<AppState>,
    RequireGlobal(admin): RequireGlobal,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<AdminUserResponse>>> {
    ensure_valid(field_violations(&input))?;

    let update = UpdateUser {
        email: input.email.as_deref().map(|s| s.trim().to_string()),
        first_name: input.first_name.as_deref().map(|s| s.trim().to_string()),
        last_name: input.last_name.as_deref().map(|s| s.trim().to_string()),
        is_active: input.is_active,
    };
    let reassign =
        input.role.is_some() || input.organization_id.is_some() || input.detach_organization;
    let assignment = |role: Role, organization_id: Option<DbId>| {
        let organization_id = if input.detach_organization {
            None
        } else {
            input.organization_id.or(organization_id)
        };
        (input.role.unwrap_or(role), organization_id)
    };

    // Account fields and assignment commit together or not at all.
    let mut tx = state.pool.begin().await?;
    let user = UserRepo::update(&mut *tx, id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    let profile = match ProfileRepo::find_by_user_id(&mut *tx, id).await? {
        Some(current) if reassign => {
            let (role, organization_id) = assignment(current.role, current.organization_id);
            ProfileRepo::update_assignment(&mut *tx, id, role, organization_id)
                .await?
                .ok_or_else(|| AppError::not_found("Profile", id))?
        }
        Some(current) => current,
        None => {
            let (role, organization_id) = assignment(Role::default(), None);
            ProfileRepo::create(
                &mut *tx,
                &CreateProfile {
                    user_id: id,
                    phone: String::new(),
                    role,
                    organization_id,
                },
            )
            .await?
        }
    };

    if !user.is_active {
        SessionRepo::revoke_all_for_user(&mut *tx, id).await?;
    }
    tx.commit().await?;

    if user.is_active {
        tracing::info!(admin_id = admin.user_id, user_id = id, "User updated");
    } else {
        tracing::info!(admin_id = admin.user_id, user_id = id, "User updated and deactivated");
    }

    Ok(Json(DataResponse::new(build_user_response(
        &user,
        Some(&profile),
    ))))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate a user and revoke their sessions. Returns 204, also for
/// a user that was already inactive.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireGlobal(admin): RequireGlobal,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".into(),
        ));
    }
    if !UserRepo::deactivate(&state.pool, id).await?
        && UserRepo::find_by_id(&state.pool, id).await?.is_none()
    {
        return Err(AppError::not_found("User", id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(admin_id = admin.user_id, user_id = id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Users without a profile row report the default role and no organization.
fn build_user_response(user: &User, profile: Option<&Profile>) -> AdminUserResponse {
    AdminUserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_superuser: user.is_superuser,
        is_active: user.is_active,
        role: profile.map(|p| p.role).unwrap_or_default(),
        organization_id: profile.and_then(|p| p.organization_id),
        last_login_at: user.last_login_at,
        created_at: user.created_at,
    }
}
