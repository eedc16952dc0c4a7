//! Measurement model and DTOs.

use ecoenergy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A measurement row joined with its device name and owning organization.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Measurement {
    pub id: DbId,
    pub device_id: DbId,
    pub device_name: String,
    pub organization_id: DbId,
    pub recorded_at: Timestamp,
    pub consumption_kwh: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a measurement. `recorded_at` defaults to now.
#[derive(Debug, Clone)]
pub struct CreateMeasurement {
    pub device_id: DbId,
    pub consumption_kwh: f64,
    pub recorded_at: Option<Timestamp>,
}

/// DTO for correcting a measurement.
#[derive(Debug, Clone, Default)]
pub struct UpdateMeasurement {
    pub consumption_kwh: Option<f64>,
    pub recorded_at: Option<Timestamp>,
}

/// Optional list filters plus paging.
#[derive(Debug, Clone)]
pub struct MeasurementFilter {
    pub device_id: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}
