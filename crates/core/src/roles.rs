//! Profile roles.
//!
//! The string forms must match the `chk_profiles_role` constraint in
//! `20260301000002_create_users_and_profiles.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_PLATFORM_MANAGER: &str = "platform_manager";
pub const ROLE_CLIENT_ADMIN: &str = "client_admin";
pub const ROLE_CLIENT_TECHNICIAN: &str = "client_technician";

/// Role attached to a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// EcoEnergy staff with access to every organization.
    PlatformManager,
    /// Full CRUD within their own organization.
    ClientAdmin,
    /// Measurement CRUD and read-only inventory within their own organization.
    #[default]
    ClientTechnician,
}

impl Role {
    pub const ALL: [Role; 3] = [
        Role::PlatformManager,
        Role::ClientAdmin,
        Role::ClientTechnician,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PlatformManager => ROLE_PLATFORM_MANAGER,
            Role::ClientAdmin => ROLE_CLIENT_ADMIN,
            Role::ClientTechnician => ROLE_CLIENT_TECHNICIAN,
        }
    }

    /// Human-readable label for reports and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Role::PlatformManager => "Platform Manager",
            Role::ClientAdmin => "Client Admin",
            Role::ClientTechnician => "Client Technician",
        }
    }

    /// Whether the role is bound to a single organization.
    pub fn is_client(&self) -> bool {
        !matches!(self, Role::PlatformManager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown role '{s}'")))
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_role_from_its_string_form() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn default_role_is_technician() {
        assert_eq!(Role::default(), Role::ClientTechnician);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::ClientAdmin).unwrap();
        assert_eq!(json, "\"client_admin\"");
    }
}
