//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login                   -> login
/// POST /refresh                 -> refresh
/// POST /logout                  -> logout (requires auth)
/// POST /register                -> register
/// POST /password-reset          -> request_password_reset
/// POST /password-reset/confirm  -> confirm_password_reset
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/register", post(auth::register))
        .route("/password-reset", post(auth::request_password_reset))
        .route(
            "/password-reset/confirm",
            post(auth::confirm_password_reset),
        )
}
