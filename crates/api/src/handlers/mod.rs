pub mod account;
pub mod admin;
pub mod alert;
pub mod auth;
pub mod dashboard;
pub mod device;
pub mod measurement;
pub mod organization;
pub mod zone;

use ecoenergy_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Organization filter for a single-object lookup.
///
/// A caller whose scope is empty gets the same 404 as for a missing row.
pub(crate) fn scoped_lookup(user: &AuthUser, entity: &'static str, id: DbId) -> AppResult<Option<DbId>> {
    user.scope()
        .org_filter()
        .ok_or_else(|| AppError::not_found(entity, id))
}
