//! Profile model: role and organization attached to a user.

use ecoenergy_core::roles::Role;
use ecoenergy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A profile row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub user_id: DbId,
    pub phone: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub organization_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a profile.
#[derive(Debug, Clone)]
pub struct CreateProfile {
    pub user_id: DbId,
    pub phone: String,
    pub role: Role,
    pub organization_id: Option<DbId>,
}
