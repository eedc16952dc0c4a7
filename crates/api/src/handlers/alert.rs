//! Handlers for the `/alerts` resource.
//!
//! Alerts are raised by recorded measurements; there is no create endpoint.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ecoenergy_core::access::{Action, Resource};
use ecoenergy_core::types::DbId;
use ecoenergy_db::models::alert::{Alert, AlertFilter};
use ecoenergy_db::repositories::AlertRepo;

use super::scoped_lookup;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::AlertListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/alerts
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<AlertListParams>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    user.require(Action::Read, Resource::Alert)?;
    let Some(org) = user.scope().org_filter() else {
        return Ok(Json(DataResponse::new(Vec::new())));
    };
    let filter = AlertFilter {
        severity: params.severity,
        device_id: params.device_id,
    };
    let alerts = AlertRepo::list(&state.pool, org, &filter).await?;
    Ok(Json(DataResponse::new(alerts)))
}

/// GET /api/v1/alerts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Alert>>> {
    user.require(Action::Read, Resource::Alert)?;
    let org = scoped_lookup(&user, "Alert", id)?;
    let alert = AlertRepo::find_by_id(&state.pool, id, org)
        .await?
        .ok_or_else(|| AppError::not_found("Alert", id))?;
    Ok(Json(DataResponse::new(alert)))
}

/// DELETE /api/v1/alerts/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.require(Action::Write, Resource::Alert)?;
    let org = scoped_lookup(&user, "Alert", id)?;
    if !AlertRepo::delete(&state.pool, id, org).await? {
        return Err(AppError::not_found("Alert", id));
    }
    tracing::info!(user_id = user.user_id, alert_id = id, "Alert dismissed");
    Ok(StatusCode::NO_CONTENT)
}
