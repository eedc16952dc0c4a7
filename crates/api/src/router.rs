//! The EcoEnergy HTTP surface.
//!
//! ```text
//! /health            liveness and database check, unauthenticated
//! /api/v1/...        tenant-scoped JSON API (routes::api_routes)
//! ```
//!
//! The server binary and the integration tests both go through
//! [`build_app_router`], so tests exercise the production middleware.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Header carrying the per-request id, generated when the client sends none.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Methods used by the inventory, measurement and account endpoints.
const CORS_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// Preflight results may be cached by browsers for an hour.
const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

/// Assemble `/health` and `/api/v1` behind the shared middleware stack.
///
/// Outermost first, a request passes CORS, gets a request id, is traced,
/// has the id copied to its response, is bounded by the request timeout
/// (408), and finally any handler panic becomes a 500.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));
    let timeout = TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.request_timeout_secs),
    );

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(timeout)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(trace)
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// CORS for the configured frontend origins. Bearer tokens travel in the
/// `Authorization` header, so credentials are allowed.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(parse_origins(&config.cors_origins))
        .allow_methods(CORS_METHODS)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}

/// Startup-time parse of `CORS_ORIGINS`; a malformed origin aborts the server.
fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect()
}
