//! Handlers for the `/zones` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ecoenergy_core::access::{Action, Resource};
use ecoenergy_core::types::DbId;
use ecoenergy_core::validation::require_name;
use ecoenergy_db::models::device::{Device, DeviceFilter};
use ecoenergy_db::models::zone::{CreateZone, UpdateZone, Zone, ZoneSummary};
use ecoenergy_db::repositories::{DeviceRepo, ZoneRepo};
use serde::{Deserialize, Serialize};

use super::scoped_lookup;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_NAME_LEN: usize = 100;

/// Request body for `POST /zones`.
///
/// `organization_id` is required for global callers and optional (defaulting
/// to the caller's own) for client admins.
#[derive(Debug, Deserialize)]
pub struct CreateZoneRequest {
    pub name: String,
    pub organization_id: Option<DbId>,
}

/// Request body for `PUT /zones/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateZoneRequest {
    pub name: Option<String>,
}

/// A zone with the devices it contains.
#[derive(Debug, Serialize)]
pub struct ZoneDetail {
    #[serde(flatten)]
    pub zone: Zone,
    pub devices: Vec<Device>,
}

/// GET /api/v1/zones
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ZoneSummary>>>> {
    user.require(Action::Read, Resource::Zone)?;
    let Some(org) = user.scope().org_filter() else {
        return Ok(Json(DataResponse::new(Vec::new())));
    };
    let zones = ZoneRepo::list(&state.pool, org).await?;
    Ok(Json(DataResponse::new(zones)))
}

/// GET /api/v1/zones/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ZoneDetail>>> {
    user.require(Action::Read, Resource::Zone)?;
    let org = scoped_lookup(&user, "Zone", id)?;
    let zone = ZoneRepo::find_by_id(&state.pool, id, org)
        .await?
        .ok_or_else(|| AppError::not_found("Zone", id))?;
    let devices = DeviceRepo::list(
        &state.pool,
        org,
        &DeviceFilter {
            zone_id: Some(zone.id),
            ..Default::default()
        },
    )
    .await?;
    Ok(Json(DataResponse::new(ZoneDetail { zone, devices })))
}

/// POST /api/v1/zones
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateZoneRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Zone>>)> {
    user.require(Action::Write, Resource::Zone)?;
    let organization_id = user.scope().resolve_owner(input.organization_id)?;
    let name = require_name(&input.name, "name", MAX_NAME_LEN)?;

    let zone = ZoneRepo::create(
        &state.pool,
        &CreateZone {
            name,
            organization_id,
        },
    )
    .await?;
    tracing::info!(
        user_id = user.user_id,
        organization_id,
        zone_id = zone.id,
        "Zone created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(zone))))
}

/// PUT /api/v1/zones/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateZoneRequest>,
) -> AppResult<Json<DataResponse<Zone>>> {
    user.require(Action::Write, Resource::Zone)?;
    let org = scoped_lookup(&user, "Zone", id)?;
    let name = input
        .name
        .as_deref()
        .map(|n| require_name(n, "name", MAX_NAME_LEN))
        .transpose()?;

    let zone = ZoneRepo::update(&state.pool, id, org, &UpdateZone { name })
        .await?
        .ok_or_else(|| AppError::not_found("Zone", id))?;
    tracing::info!(user_id = user.user_id, zone_id = id, "Zone updated");
    Ok(Json(DataResponse::new(zone)))
}

/// DELETE /api/v1/zones/{id}
///
/// Cascades to the zone's devices and their readings and alerts.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.require(Action::Write, Resource::Zone)?;
    let org = scoped_lookup(&user, "Zone", id)?;
    if !ZoneRepo::delete(&state.pool, id, org).await? {
        return Err(AppError::not_found("Zone", id));
    }
    tracing::info!(user_id = user.user_id, zone_id = id, "Zone deleted");
    Ok(StatusCode::NO_CONTENT)
}
