//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches

pub mod alert;
pub mod device;
pub mod measurement;
pub mod organization;
pub mod password_reset;
pub mod profile;
pub mod session;
pub mod user;
pub mod zone;
