//! Handlers for the `/account` resource: the caller's own profile and password.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use ecoenergy_core::error::CoreError;
use ecoenergy_core::types::{DbId, Timestamp};
use ecoenergy_core::validation::{
    ensure_valid, field_violations, password_violations, FieldViolation,
};
use ecoenergy_db::models::profile::Profile;
use ecoenergy_db::models::user::{UpdateUser, User};
use ecoenergy_db::repositories::{ProfileRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /account/profile`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 15, message = "Phone must be at most 15 characters"))]
    pub phone: String,
}

/// Request body for `POST /account/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// The caller's account as returned by `/account/profile`.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
    pub last_login_at: Option<Timestamp>,
    pub profile: Profile,
}

/// GET /api/v1/account/profile
pub async fn get_profile(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let user = load_user(&state, auth.user_id).await?;
    let profile = ProfileRepo::get_or_create(&state.pool, user.id).await?;
    Ok(Json(DataResponse::new(account_response(user, profile))))
}

/// PUT /api/v1/account/profile
///
/// Updates names, email and phone. Role and organization are managed by
/// administrators only.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    ensure_valid(field_violations(&input))?;
    load_user(&state, auth.user_id).await?;

    let update = UpdateUser {
        email: Some(input.email.trim().to_string()),
        first_name: Some(input.first_name.trim().to_string()),
        last_name: Some(input.last_name.trim().to_string()),
        is_active: None,
    };
    let user = UserRepo::update(&state.pool, auth.user_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User", auth.user_id))?;

    ProfileRepo::get_or_create(&state.pool, user.id).await?;
    let profile = ProfileRepo::update_phone(&state.pool, user.id, input.phone.trim())
        .await?
        .ok_or_else(|| AppError::not_found("Profile", user.id))?;

    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(DataResponse::new(account_response(user, profile))))
}

/// POST /api/v1/account/password
///
/// Change the caller's password. Existing sessions stay valid.
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let user = load_user(&state, auth.user_id).await?;

    let old_ok = verify_password(&input.old_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    let mut violations = Vec::new();
    if !old_ok {
        violations.push(FieldViolation::new(
            "old_password",
            "Current password is incorrect",
        ));
    }
    violations.extend(password_violations(&input.new_password, "new_password"));
    if input.new_password != input.new_password_confirm {
        violations.push(FieldViolation::new(
            "new_password_confirm",
            "Passwords do not match",
        ));
    }
    ensure_valid(violations)?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &hashed).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

async fn load_user(state: &AppState, user_id: DbId) -> AppResult<User> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", user_id))?;
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }
    Ok(user)
}

fn account_response(user: User, profile: Profile) -> AccountResponse {
    AccountResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        is_superuser: user.is_superuser,
        last_login_at: user.last_login_at,
        profile,
    }
}
