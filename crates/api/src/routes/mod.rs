pub mod account;
pub mod admin;
pub mod alert;
pub mod auth;
pub mod dashboard;
pub mod device;
pub mod health;
pub mod measurement;
pub mod organization;
pub mod zone;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                        login (public)
/// /auth/refresh                      refresh (public)
/// /auth/logout                       logout (requires auth)
/// /auth/register                     self-service signup (public)
/// /auth/password-reset               request reset token (public)
/// /auth/password-reset/confirm       set new password (public)
///
/// /account/profile                   get, update own profile
/// /account/password                  change own password
///
/// /admin/users                       list, create (global only)
/// /admin/users/{id}                  get, update, deactivate
///
/// /organizations                     list (scoped), create (global only)
/// /organizations/{id}                get (scoped), update, delete (global only)
///
/// /zones                             list, create
/// /zones/{id}                        get, update, delete
///
/// /devices                           list (?category=&zone_id=), create
/// /devices/export                    CSV export (same filters)
/// /devices/{id}                      detail, update, delete
///
/// /measurements                      list (?device_id=&limit=&offset=), create
/// /measurements/{id}                 get, update, delete
///
/// /alerts                            list (?severity=&device_id=)
/// /alerts/{id}                       get, delete
///
/// /dashboard                         overview
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/account", account::router())
        .nest("/admin", admin::router())
        .nest("/organizations", organization::router())
        .nest("/zones", zone::router())
        .nest("/devices", device::router())
        .nest("/measurements", measurement::router())
        .nest("/alerts", alert::router())
        .nest("/dashboard", dashboard::router())
}
