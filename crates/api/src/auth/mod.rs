//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access tokens carrying the caller's tenant claims, plus
//!   opaque refresh and reset token helpers.

pub mod jwt;
pub mod password;
