//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller decoded from a JWT Bearer token.
//! - [`rbac::RequireGlobal`] -- superusers and platform managers only.
//! - [`rbac::RequireAuth`] -- any authenticated user.

pub mod auth;
pub mod rbac;
