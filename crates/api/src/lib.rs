//! EcoEnergy API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes) so
//! integration tests and the binary entrypoint share the same router.

pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod handlers;
pub mod middleware;
pub mod notify;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
