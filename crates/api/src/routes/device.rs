//! Route definitions for the `/devices` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::device;
use crate::state::AppState;

/// Routes mounted at `/devices`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// GET    /export  -> export (CSV)
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(device::list).post(device::create))
        .route("/export", get(device::export))
        .route(
            "/{id}",
            get(device::get_by_id)
                .put(device::update)
                .delete(device::delete),
        )
}
