//! Handlers for the `/devices` resource, including the CSV export.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use ecoenergy_core::access::{Action, Resource};
use ecoenergy_core::consumption::SeverityBuckets;
use ecoenergy_core::device::DeviceCategory;
use ecoenergy_core::error::CoreError;
use ecoenergy_core::types::DbId;
use ecoenergy_core::validation::{require_name, validate_non_negative};
use ecoenergy_db::models::device::{CreateDevice, Device, DeviceFilter, UpdateDevice};
use ecoenergy_db::models::measurement::Measurement;
use ecoenergy_db::repositories::{DeviceRepo, MeasurementRepo, ZoneRepo};
use serde::{Deserialize, Serialize};

use super::scoped_lookup;
use crate::error::{AppError, AppResult};
use crate::export::devices_to_csv;
use crate::middleware::auth::AuthUser;
use crate::query::DeviceListParams;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_NAME_LEN: usize = 100;

/// Request body for `POST /devices`.
#[derive(Debug, Deserialize)]
pub struct CreateDeviceRequest {
    pub name: String,
    #[serde(default)]
    pub category: DeviceCategory,
    pub zone_id: DbId,
    #[serde(default)]
    pub watts: f64,
}

/// Request body for `PUT /devices/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateDeviceRequest {
    pub name: Option<String>,
    pub category: Option<DeviceCategory>,
    pub zone_id: Option<DbId>,
    pub watts: Option<f64>,
}

/// A device with its readings (newest first) grouped by severity.
#[derive(Debug, Serialize)]
pub struct DeviceDetail {
    #[serde(flatten)]
    pub device: Device,
    pub measurements: Vec<Measurement>,
    pub severity: SeverityBuckets<Measurement>,
}

/// GET /api/v1/devices
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<DeviceListParams>,
) -> AppResult<Json<DataResponse<Vec<Device>>>> {
    let devices = visible_devices(&state, &user, params).await?;
    Ok(Json(DataResponse::new(devices)))
}

/// GET /api/v1/devices/export
///
/// Same rows and filters as the list, as a CSV download.
pub async fn export(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<DeviceListParams>,
) -> AppResult<impl IntoResponse> {
    let devices = visible_devices(&state, &user, params).await?;
    let body = devices_to_csv(&devices)
        .map_err(|e| AppError::InternalError(format!("CSV export error: {e}")))?;
    tracing::info!(user_id = user.user_id, rows = devices.len(), "Device export generated");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"devices.csv\"",
            ),
        ],
        body,
    ))
}

/// GET /api/v1/devices/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DeviceDetail>>> {
    user.require(Action::Read, Resource::Device)?;
    let org = scoped_lookup(&user, "Device", id)?;
    let device = DeviceRepo::find_by_id(&state.pool, id, org)
        .await?
        .ok_or_else(|| AppError::not_found("Device", id))?;

    let measurements = MeasurementRepo::list_for_device(&state.pool, device.id).await?;
    let severity = SeverityBuckets::from_items(measurements.iter().cloned(), |m| m.consumption_kwh);

    Ok(Json(DataResponse::new(DeviceDetail {
        device,
        measurements,
        severity,
    })))
}

/// POST /api/v1/devices
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateDeviceRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Device>>)> {
    user.require(Action::Write, Resource::Device)?;
    let org = writable_org(&user)?;
    let name = require_name(&input.name, "name", MAX_NAME_LEN)?;
    validate_non_negative(input.watts, "watts")?;
    ensure_zone_visible(&state, org, input.zone_id).await?;

    let device = DeviceRepo::create(
        &state.pool,
        &CreateDevice {
            name,
            category: input.category,
            zone_id: input.zone_id,
            watts: input.watts,
        },
    )
    .await?;
    tracing::info!(
        user_id = user.user_id,
        organization_id = device.organization_id,
        device_id = device.id,
        "Device created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(device))))
}

/// PUT /api/v1/devices/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDeviceRequest>,
) -> AppResult<Json<DataResponse<Device>>> {
    user.require(Action::Write, Resource::Device)?;
    let org = scoped_lookup(&user, "Device", id)?;
    let name = input
        .name
        .as_deref()
        .map(|n| require_name(n, "name", MAX_NAME_LEN))
        .transpose()?;
    if let Some(watts) = input.watts {
        validate_non_negative(watts, "watts")?;
    }
    if let Some(zone_id) = input.zone_id {
        ensure_zone_visible(&state, org, zone_id).await?;
    }

    let update = UpdateDevice {
        name,
        category: input.category,
        zone_id: input.zone_id,
        watts: input.watts,
    };
    let device = DeviceRepo::update(&state.pool, id, org, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Device", id))?;
    tracing::info!(user_id = user.user_id, device_id = id, "Device updated");
    Ok(Json(DataResponse::new(device)))
}

/// DELETE /api/v1/devices/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.require(Action::Write, Resource::Device)?;
    let org = scoped_lookup(&user, "Device", id)?;
    if !DeviceRepo::delete(&state.pool, id, org).await? {
        return Err(AppError::not_found("Device", id));
    }
    tracing::info!(user_id = user.user_id, device_id = id, "Device deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn visible_devices(
    state: &AppState,
    user: &AuthUser,
    params: DeviceListParams,
) -> AppResult<Vec<Device>> {
    user.require(Action::Read, Resource::Device)?;
    let Some(org) = user.scope().org_filter() else {
        return Ok(Vec::new());
    };
    let filter = DeviceFilter {
        category: params.category,
        zone_id: params.zone_id,
    };
    Ok(DeviceRepo::list(&state.pool, org, &filter).await?)
}

/// Organization filter for a write, or 403 for callers without a tenant.
pub(crate) fn writable_org(user: &AuthUser) -> AppResult<Option<DbId>> {
    user.scope().org_filter().ok_or_else(|| {
        AppError::Core(CoreError::Forbidden(
            "User is not assigned to an organization".into(),
        ))
    })
}

/// A zone outside the caller's scope is reported like a missing one.
async fn ensure_zone_visible(state: &AppState, org: Option<DbId>, zone_id: DbId) -> AppResult<()> {
    if ZoneRepo::find_by_id(&state.pool, zone_id, org).await?.is_none() {
        return Err(AppError::Core(CoreError::field(
            "zone_id",
            format!("Zone {zone_id} does not exist"),
        )));
    }
    Ok(())
}
