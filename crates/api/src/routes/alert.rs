//! Route definitions for the `/alerts` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::alert;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET    /      -> list
/// GET    /{id}  -> get_by_id
/// DELETE /{id}  -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alert::list))
        .route("/{id}", get(alert::get_by_id).delete(alert::delete))
}
