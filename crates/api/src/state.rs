use std::sync::Arc;

use crate::config::ServerConfig;
use crate::notify::ResetNotifier;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference-counted and everything else sits
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ecoenergy_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Delivers password-reset tokens to users.
    pub reset_notifier: Arc<dyn ResetNotifier>,
}
