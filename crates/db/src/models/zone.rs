//! Zone model and DTOs.

use ecoenergy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A zone row from the `zones` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Zone {
    pub id: DbId,
    pub name: String,
    pub organization_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A zone joined with its organization name and device count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ZoneSummary {
    pub id: DbId,
    pub name: String,
    pub organization_id: DbId,
    pub organization_name: String,
    pub device_count: i64,
    pub created_at: Timestamp,
}

/// DTO for creating a zone. The owner is resolved before this is built.
#[derive(Debug, Clone)]
pub struct CreateZone {
    pub name: String,
    pub organization_id: DbId,
}

/// DTO for renaming a zone.
#[derive(Debug, Clone, Default)]
pub struct UpdateZone {
    pub name: Option<String>,
}
