//! Handlers for the `/auth` resource (login, refresh, logout, registration,
//! password reset).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use ecoenergy_core::access::Principal;
use ecoenergy_core::error::CoreError;
use ecoenergy_core::roles::Role;
use ecoenergy_core::types::DbId;
use ecoenergy_core::validation::{
    ensure_valid, field_violations, name_violations, password_violations, FieldViolation,
    MAX_USERNAME_LENGTH,
};
use ecoenergy_db::models::profile::{CreateProfile, Profile};
use ecoenergy_db::models::session::CreateSession;
use ecoenergy_db::models::user::{CreateUser, User};
use ecoenergy_db::repositories::{PasswordResetRepo, ProfileRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_opaque_token, hash_token};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notify::PasswordResetNotice;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

/// Lifetime of a password reset token.
const RESET_TOKEN_EXPIRY_MINS: i64 = 60;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
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
    pub password_confirm: String,
}

/// Request body for `POST /auth/password-reset`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Request body for `POST /auth/password-reset/confirm`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Successful authentication response returned by login, refresh and register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub organization_id: Option<DbId>,
    pub is_superuser: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            ))
        })?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        UserRepo::increment_failed_login(&state.pool, user.id).await?;

        if user.failed_login_count + 1 >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, %lock_until, "Account locked after failed logins");
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    // Older accounts may predate their profile row.
    let profile = ProfileRepo::get_or_create(&state.pool, user.id).await?;

    let response = create_auth_response(&state, &user, &profile).await?;
    tracing::info!(
        user_id = user.id,
        role = %profile.role,
        organization_id = ?profile.organization_id,
        "User logged in",
    );
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new tokens. Role and organization are
/// re-read, so assignment changes take effect on refresh.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    // Rotation: the presented token is spent whether or not the rest succeeds.
    if !SessionRepo::revoke(&state.pool, session.id).await? {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        )));
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let profile = ProfileRepo::get_or_create(&state.pool, user.id).await?;
    let response = create_auth_response(&state, &user, &profile).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/register
///
/// Self-service signup. The new account is a technician with no
/// organization until an administrator assigns one.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let mut violations = field_violations(&input);
    violations.extend(name_violations(&input.username, "username", MAX_USERNAME_LENGTH));
    violations.extend(password_violations(&input.password, "password"));
    if input.password != input.password_confirm {
        violations.push(FieldViolation::new(
            "password_confirm",
            "Passwords do not match",
        ));
    }
    ensure_valid(violations)?;

    let username = input.username.trim();
    if UserRepo::exists_by_username(&state.pool, username).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Username '{username}' is already taken"
        ))));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let mut tx = state.pool.begin().await?;
    let user = UserRepo::create(
        &mut *tx,
        &CreateUser {
            username: username.to_string(),
            email: input.email.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            password_hash,
            is_superuser: false,
        },
    )
    .await?;
    let profile = ProfileRepo::create(
        &mut *tx,
        &CreateProfile {
            user_id: user.id,
            phone: String::new(),
            role: Role::ClientTechnician,
            organization_id: None,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let response = create_auth_response(&state, &user, &profile).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/password-reset
///
/// Always answers 202 so the endpoint cannot be used to discover which
/// emails are registered.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetRequest>,
) -> AppResult<StatusCode> {
    let email = input.email.trim();
    if email.is_empty() {
        return Ok(StatusCode::ACCEPTED);
    }

    let users = UserRepo::find_active_by_email(&state.pool, email).await?;
    for user in users {
        let (token, token_hash) = generate_opaque_token();
        let expires_at = Utc::now() + chrono::Duration::minutes(RESET_TOKEN_EXPIRY_MINS);
        PasswordResetRepo::create(&state.pool, user.id, &token_hash, expires_at).await?;

        state.reset_notifier.deliver(&PasswordResetNotice {
            user_id: user.id,
            username: user.username,
            email: user.email,
            token,
            expires_at,
        });
    }

    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/auth/password-reset/confirm
///
/// Consume a reset token and set a new password. Every session of the user
/// is revoked.
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetConfirm>,
) -> AppResult<StatusCode> {
    let invalid_token = || AppError::BadRequest("Invalid or expired reset token".into());

    let token = PasswordResetRepo::find_active_by_hash(&state.pool, &hash_token(&input.token))
        .await?
        .ok_or_else(invalid_token)?;

    let mut violations = password_violations(&input.new_password, "new_password");
    if input.new_password != input.new_password_confirm {
        violations.push(FieldViolation::new(
            "new_password_confirm",
            "Passwords do not match",
        ));
    }
    ensure_valid(violations)?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let mut tx = state.pool.begin().await?;
    if !PasswordResetRepo::consume(&mut *tx, token.id).await? {
        return Err(invalid_token());
    }
    UserRepo::update_password(&mut *tx, token.user_id, &password_hash).await?;
    SessionRepo::revoke_all_for_user(&mut *tx, token.user_id).await?;
    tx.commit().await?;

    tracing::info!(user_id = token.user_id, "Password reset completed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(
    state: &AppState,
    user: &User,
    profile: &Profile,
) -> AppResult<AuthResponse> {
    let principal = Principal {
        user_id: user.id,
        role: profile.role,
        is_superuser: user.is_superuser,
        organization_id: profile.organization_id,
    };

    let access_token = generate_access_token(&principal, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_opaque_token();

    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserInfo {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: profile.role,
            organization_id: profile.organization_id,
            is_superuser: user.is_superuser,
        },
    })
}
