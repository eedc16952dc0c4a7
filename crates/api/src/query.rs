//! Query parameter types shared by list endpoints.

use ecoenergy_core::consumption::Severity;
use ecoenergy_core::device::DeviceCategory;
use ecoenergy_core::types::DbId;
use serde::Deserialize;

/// `?category=&zone_id=` for device listing and export.
#[derive(Debug, Default, Deserialize)]
pub struct DeviceListParams {
    pub category: Option<DeviceCategory>,
    pub zone_id: Option<DbId>,
}

/// `?device_id=&limit=&offset=` for measurement listing.
///
/// Values are clamped in the handler via `clamp_limit` / `clamp_offset`.
#[derive(Debug, Default, Deserialize)]
pub struct MeasurementListParams {
    pub device_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?severity=&device_id=` for alert listing.
#[derive(Debug, Default, Deserialize)]
pub struct AlertListParams {
    pub severity: Option<Severity>,
    pub device_id: Option<DbId>,
}
