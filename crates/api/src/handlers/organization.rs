//! Handlers for the `/organizations` resource.
//!
//! Client users see only their own organization; creating, renaming and
//! deleting organizations is reserved to global principals.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ecoenergy_core::access::{Action, Resource};
use ecoenergy_core::types::DbId;
use ecoenergy_core::validation::require_name;
use ecoenergy_db::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use ecoenergy_db::repositories::OrganizationRepo;

use super::scoped_lookup;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireGlobal;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_NAME_LEN: usize = 100;

/// GET /api/v1/organizations
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Organization>>>> {
    user.require(Action::Read, Resource::Organization)?;
    let Some(org) = user.scope().org_filter() else {
        return Ok(Json(DataResponse::new(Vec::new())));
    };
    let organizations = OrganizationRepo::list(&state.pool, org).await?;
    Ok(Json(DataResponse::new(organizations)))
}

/// GET /api/v1/organizations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Organization>>> {
    user.require(Action::Read, Resource::Organization)?;
    let org = scoped_lookup(&user, "Organization", id)?;
    let organization = OrganizationRepo::find_by_id(&state.pool, id, org)
        .await?
        .ok_or_else(|| AppError::not_found("Organization", id))?;
    Ok(Json(DataResponse::new(organization)))
}

/// POST /api/v1/organizations
pub async fn create(
    State(state): State<AppState>,
    RequireGlobal(admin): RequireGlobal,
    Json(input): Json<CreateOrganization>,
) -> AppResult<(StatusCode, Json<DataResponse<Organization>>)> {
    let name = require_name(&input.name, "name", MAX_NAME_LEN)?;
    let organization = OrganizationRepo::create(&state.pool, &CreateOrganization { name }).await?;
    tracing::info!(
        user_id = admin.user_id,
        organization_id = organization.id,
        "Organization created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(organization))))
}

/// PUT /api/v1/organizations/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireGlobal(admin): RequireGlobal,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrganization>,
) -> AppResult<Json<DataResponse<Organization>>> {
    let name = input
        .name
        .as_deref()
        .map(|n| require_name(n, "name", MAX_NAME_LEN))
        .transpose()?;
    let organization = OrganizationRepo::update(&state.pool, id, &UpdateOrganization { name })
        .await?
        .ok_or_else(|| AppError::not_found("Organization", id))?;
    tracing::info!(user_id = admin.user_id, organization_id = id, "Organization updated");
    Ok(Json(DataResponse::new(organization)))
}

/// DELETE /api/v1/organizations/{id}
///
/// Cascades to the organization's zones, devices, readings and alerts, and
/// to its members' profiles. Those users keep their accounts and get a fresh
/// technician profile on next login.
pub async fn delete(
    State(state): State<AppState>,
    RequireGlobal(admin): RequireGlobal,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !OrganizationRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Organization", id));
    }
    tracing::info!(user_id = admin.user_id, organization_id = id, "Organization deleted");
    Ok(StatusCode::NO_CONTENT)
}
