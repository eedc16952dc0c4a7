//! Device model and DTOs.

use ecoenergy_core::device::DeviceCategory;
use ecoenergy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A device row joined with its zone and organization.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Device {
    pub id: DbId,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub category: DeviceCategory,
    pub watts: f64,
    pub zone_id: DbId,
    pub zone_name: String,
    pub organization_id: DbId,
    pub organization_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a device.
#[derive(Debug, Clone)]
pub struct CreateDevice {
    pub name: String,
    pub category: DeviceCategory,
    pub zone_id: DbId,
    pub watts: f64,
}

/// DTO for updating a device. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateDevice {
    pub name: Option<String>,
    pub category: Option<DeviceCategory>,
    pub zone_id: Option<DbId>,
    pub watts: Option<f64>,
}

/// Optional list filters.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    pub category: Option<DeviceCategory>,
    pub zone_id: Option<DbId>,
}
