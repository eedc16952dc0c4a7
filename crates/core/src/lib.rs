//! Domain core for the EcoEnergy monitoring service.
//!
//! Pure types and rules with no I/O: identifiers, the error taxonomy, roles
//! and tenant scoping, consumption severity classification, and input
//! validation helpers shared by the database and API crates.

pub mod access;
pub mod consumption;
pub mod device;
pub mod error;
pub mod pagination;
pub mod roles;
pub mod types;
pub mod validation;
