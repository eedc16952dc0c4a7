//! Handler for the `/dashboard` overview.

use axum::extract::State;
use axum::Json;
use ecoenergy_core::access::{Action, Resource};
use ecoenergy_core::consumption::SeverityBuckets;
use ecoenergy_db::models::measurement::Measurement;
use ecoenergy_db::models::zone::ZoneSummary;
use ecoenergy_db::repositories::{
    AlertRepo, DeviceRepo, MeasurementRepo, OrganizationRepo, ZoneRepo,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of recent readings shown on the dashboard.
const RECENT_MEASUREMENTS: i64 = 10;

/// Row counts within the caller's scope.
#[derive(Debug, Default, Serialize)]
pub struct DashboardTotals {
    pub organizations: i64,
    pub zones: i64,
    pub devices: i64,
    pub measurements: i64,
    pub alerts: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub totals: DashboardTotals,
    pub zones: Vec<ZoneSummary>,
    pub recent_measurements: Vec<Measurement>,
    /// The recent readings grouped by severity.
    pub severity: SeverityBuckets<Measurement>,
}

/// GET /api/v1/dashboard
pub async fn overview(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<DashboardResponse>>> {
    user.require(Action::Read, Resource::Measurement)?;

    let Some(org) = user.scope().org_filter() else {
        return Ok(Json(DataResponse::new(DashboardResponse {
            totals: DashboardTotals::default(),
            zones: Vec::new(),
            recent_measurements: Vec::new(),
            severity: SeverityBuckets::default(),
        })));
    };

    let recent_measurements = MeasurementRepo::latest(&state.pool, org, RECENT_MEASUREMENTS).await?;
    let zones = ZoneRepo::list(&state.pool, org).await?;

    let organizations = match org {
        None => OrganizationRepo::count(&state.pool).await?,
        Some(_) => OrganizationRepo::list(&state.pool, org).await?.len() as i64,
    };
    let totals = DashboardTotals {
        organizations,
        zones: zones.len() as i64,
        devices: DeviceRepo::count(&state.pool, org).await?,
        measurements: MeasurementRepo::count(&state.pool, org).await?,
        alerts: AlertRepo::count(&state.pool, org).await?,
    };

    let severity =
        SeverityBuckets::from_items(recent_measurements.iter().cloned(), |m| m.consumption_kwh);

    Ok(Json(DataResponse::new(DashboardResponse {
        totals,
        zones,
        recent_measurements,
        severity,
    })))
}
