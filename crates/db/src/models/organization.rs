//! Organization (tenant) model and DTOs.

use ecoenergy_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An organization row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new organization.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
}

/// DTO for renaming an organization.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrganization {
    pub name: Option<String>,
}
