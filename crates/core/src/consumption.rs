//! Consumption severity classification.
//!
//! A reading (kWh) is classified against fixed thresholds. The same rule
//! drives alert creation when a measurement is recorded and the severity
//! buckets shown on the dashboard and device detail.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Readings at or above this value are critical.
pub const CRITICAL_KWH: f64 = 100.0;
/// Readings strictly above this value (and below critical) are high.
pub const HIGH_KWH: f64 = 80.0;
/// Readings strictly above this value (and not high) are medium.
pub const MEDIUM_KWH: f64 = 60.0;
/// Largest reading accepted from clients.
pub const MAX_CONSUMPTION_KWH: f64 = 1.0e9;
/// Upper bound on alert message length, matching the `alerts.message` column check.
pub const ALERT_MESSAGE_MAX_LEN: usize = 200;

/// Alert severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Medium, Severity::High, Severity::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|sev| sev.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown severity '{s}'")))
    }
}

impl TryFrom<String> for Severity {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Classify a consumption reading. Returns `None` when no alert is warranted.
pub fn classify(consumption_kwh: f64) -> Option<Severity> {
    if consumption_kwh >= CRITICAL_KWH {
        Some(Severity::Critical)
    } else if consumption_kwh > HIGH_KWH {
        Some(Severity::High)
    } else if consumption_kwh > MEDIUM_KWH {
        Some(Severity::Medium)
    } else {
        None
    }
}

/// Message recorded on an alert raised by a reading.
pub fn alert_message(consumption_kwh: f64) -> String {
    format!("High consumption detected: {consumption_kwh:.1} kWh")
}

/// Items grouped by the severity of their reading. Items below every
/// threshold are dropped.
#[derive(Debug, Clone, Serialize)]
pub struct SeverityBuckets<T> {
    pub critical: Vec<T>,
    pub high: Vec<T>,
    pub medium: Vec<T>,
}

impl<T> Default for SeverityBuckets<T> {
    fn default() -> Self {
        Self {
            critical: Vec::new(),
            high: Vec::new(),
            medium: Vec::new(),
        }
    }
}

impl<T> SeverityBuckets<T> {
    /// Group `items`, reading each one's consumption with `consumption`.
    /// Input order is preserved within each bucket.
    pub fn from_items<I, F>(items: I, consumption: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> f64,
    {
        let mut buckets = Self::default();
        for item in items {
            match classify(consumption(&item)) {
                Some(Severity::Critical) => buckets.critical.push(item),
                Some(Severity::High) => buckets.high.push(item),
                Some(Severity::Medium) => buckets.medium.push(item),
                None => {}
            }
        }
        buckets
    }

    pub fn total(&self) -> usize {
        self.critical.len() + self.high.len() + self.medium.len()
    }
}
