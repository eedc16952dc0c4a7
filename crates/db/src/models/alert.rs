//! Alert model and DTOs.

use ecoenergy_core::consumption::Severity;
use ecoenergy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An alert row joined with its device name and owning organization.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub device_id: DbId,
    pub device_name: String,
    pub organization_id: DbId,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    pub created_at: Timestamp,
}

/// DTO for raising an alert.
#[derive(Debug, Clone)]
pub struct CreateAlert {
    pub device_id: DbId,
    pub message: String,
    pub severity: Severity,
    pub created_at: Option<Timestamp>,
}

/// Optional list filters.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub device_id: Option<DbId>,
}
