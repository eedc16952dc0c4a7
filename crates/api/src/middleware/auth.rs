//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use ecoenergy_core::access::{Action, Principal, Resource, Scope};
use ecoenergy_core::error::CoreError;
use ecoenergy_core::roles::Role;
use ecoenergy_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `Authorization: Bearer` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     user.require(Action::Read, Resource::Zone)?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: Role,
    pub is_superuser: bool,
    pub organization_id: Option<DbId>,
}

impl AuthUser {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            role: self.role,
            is_superuser: self.is_superuser,
            organization_id: self.organization_id,
        }
    }

    pub fn scope(&self) -> Scope {
        self.principal().scope()
    }

    /// Role check; returns 403 when the role does not permit the action.
    pub fn require(&self, action: Action, resource: Resource) -> Result<(), AppError> {
        self.principal().require(action, resource)?;
        Ok(())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            is_superuser: claims.su,
            organization_id: claims.org,
        })
    }
}
