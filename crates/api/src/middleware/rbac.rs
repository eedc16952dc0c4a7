//! Role-based access control extractors.
//!
//! Per-resource permissions are checked in handlers via
//! [`AuthUser::require`]; these extractors cover whole route groups.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use ecoenergy_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a superuser or platform manager. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn admin_only(RequireGlobal(user): RequireGlobal) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireGlobal(pub AuthUser);

impl FromRequestParts<AppState> for RequireGlobal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.principal().is_global() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Platform manager role required".into(),
            )));
        }
        Ok(RequireGlobal(user))
    }
}

/// Requires any authenticated user.
///
/// Equivalent to [`AuthUser`], named for routes where "must be logged in"
/// should read explicitly.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
