//! Device categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// What kind of asset a device is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Sensor,
    Actuator,
    #[default]
    General,
}

impl DeviceCategory {
    pub const ALL: [DeviceCategory; 3] = [
        DeviceCategory::Sensor,
        DeviceCategory::Actuator,
        DeviceCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceCategory::Sensor => "sensor",
            DeviceCategory::Actuator => "actuator",
            DeviceCategory::General => "general",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown device category '{s}'")))
    }
}

impl TryFrom<String> for DeviceCategory {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_categories() {
        assert_eq!("sensor".parse::<DeviceCategory>().unwrap(), DeviceCategory::Sensor);
        assert_eq!(
            "actuator".parse::<DeviceCategory>().unwrap(),
            DeviceCategory::Actuator
        );
        assert!("Sensor".parse::<DeviceCategory>().is_err());
    }
}
