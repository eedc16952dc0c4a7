//! Handlers for the `/measurements` resource.
//!
//! Recording a reading that crosses a consumption threshold also raises an
//! alert for the device, atomically with the reading.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ecoenergy_core::access::{Action, Resource};
use ecoenergy_core::error::CoreError;
use ecoenergy_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use ecoenergy_core::types::{DbId, Timestamp};
use ecoenergy_core::validation::validate_consumption;
use ecoenergy_db::models::alert::Alert;
use ecoenergy_db::models::measurement::{
    CreateMeasurement, Measurement, MeasurementFilter, UpdateMeasurement,
};
use ecoenergy_db::repositories::{DeviceRepo, MeasurementRepo};
use serde::{Deserialize, Serialize};

use super::device::writable_org;
use super::scoped_lookup;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::MeasurementListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /measurements`.
#[derive(Debug, Deserialize)]
pub struct CreateMeasurementRequest {
    pub device_id: DbId,
    pub consumption_kwh: f64,
    /// Defaults to now.
    pub recorded_at: Option<Timestamp>,
}

/// Request body for `PUT /measurements/{id}`.
///
/// Editing a reading does not revisit alerts already raised for it.
#[derive(Debug, Deserialize)]
pub struct UpdateMeasurementRequest {
    pub consumption_kwh: Option<f64>,
    pub recorded_at: Option<Timestamp>,
}

/// A newly recorded reading and the alert it raised, if any.
#[derive(Debug, Serialize)]
pub struct RecordedMeasurement {
    #[serde(flatten)]
    pub measurement: Measurement,
    pub alert: Option<Alert>,
}

/// GET /api/v1/measurements
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<MeasurementListParams>,
) -> AppResult<Json<DataResponse<Vec<Measurement>>>> {
    user.require(Action::Read, Resource::Measurement)?;
    let Some(org) = user.scope().org_filter() else {
        return Ok(Json(DataResponse::new(Vec::new())));
    };
    let filter = MeasurementFilter {
        device_id: params.device_id,
        limit: clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        offset: clamp_offset(params.offset),
    };
    let measurements = MeasurementRepo::list(&state.pool, org, &filter).await?;
    Ok(Json(DataResponse::new(measurements)))
}

/// GET /api/v1/measurements/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Measurement>>> {
    user.require(Action::Read, Resource::Measurement)?;
    let org = scoped_lookup(&user, "Measurement", id)?;
    let measurement = MeasurementRepo::find_by_id(&state.pool, id, org)
        .await?
        .ok_or_else(|| AppError::not_found("Measurement", id))?;
    Ok(Json(DataResponse::new(measurement)))
}

/// POST /api/v1/measurements
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateMeasurementRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<RecordedMeasurement>>)> {
    user.require(Action::Write, Resource::Measurement)?;
    let org = writable_org(&user)?;
    validate_consumption(input.consumption_kwh, "consumption_kwh")?;

    if DeviceRepo::find_by_id(&state.pool, input.device_id, org)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::field(
            "device_id",
            format!("Device {} does not exist", input.device_id),
        )));
    }

    let (measurement, alert) = MeasurementRepo::record(
        &state.pool,
        &CreateMeasurement {
            device_id: input.device_id,
            consumption_kwh: input.consumption_kwh,
            recorded_at: input.recorded_at,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.user_id,
        organization_id = measurement.organization_id,
        device_id = measurement.device_id,
        measurement_id = measurement.id,
        consumption_kwh = measurement.consumption_kwh,
        "Measurement recorded",
    );
    if let Some(alert) = &alert {
        tracing::warn!(
            device_id = alert.device_id,
            alert_id = alert.id,
            severity = %alert.severity,
            "Consumption alert raised",
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(RecordedMeasurement { measurement, alert })),
    ))
}

/// PUT /api/v1/measurements/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMeasurementRequest>,
) -> AppResult<Json<DataResponse<Measurement>>> {
    user.require(Action::Write, Resource::Measurement)?;
    let org = scoped_lookup(&user, "Measurement", id)?;
    if let Some(kwh) = input.consumption_kwh {
        validate_consumption(kwh, "consumption_kwh")?;
    }

    let update = UpdateMeasurement {
        consumption_kwh: input.consumption_kwh,
        recorded_at: input.recorded_at,
    };
    let measurement = MeasurementRepo::update(&state.pool, id, org, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Measurement", id))?;
    tracing::info!(user_id = user.user_id, measurement_id = id, "Measurement updated");
    Ok(Json(DataResponse::new(measurement)))
}

/// DELETE /api/v1/measurements/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.require(Action::Write, Resource::Measurement)?;
    let org = scoped_lookup(&user, "Measurement", id)?;
    if !MeasurementRepo::delete(&state.pool, id, org).await? {
        return Err(AppError::not_found("Measurement", id));
    }
    tracing::info!(user_id = user.user_id, measurement_id = id, "Measurement deleted");
    Ok(StatusCode::NO_CONTENT)
}
