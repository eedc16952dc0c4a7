//! Route definitions for the `/measurements` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::measurement;
use crate::state::AppState;

/// Routes mounted at `/measurements`.
///
/// ```text
/// GET    /      -> list
/// POST   /      -> create
/// GET    /{id}  -> get_by_id
/// PUT    /{id}  -> update
/// DELETE /{id}  -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(measurement::list).post(measurement::create))
        .route(
            "/{id}",
            get(measurement::get_by_id)
                .put(measurement::update)
                .delete(measurement::delete),
        )
}
