//! Severity tiers derived from the health factor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default health factor below which an alert fires.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 1.2;
/// Default health factor below which severity is critical.
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 1.05;

/// Liquidation risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Health factor at or above the alert threshold
    Safe,
    /// Below the alert threshold
    Warning,
    /// Below the critical threshold, liquidation imminent
    Critical,
}

impl Severity {
    /// Recommended action for this tier.
    pub fn action(&self) -> &'static str {
        match self {
            Severity::Safe => "No action needed",
            Severity::Warning => "Add collateral or repay debt",
            Severity::Critical => "Repay debt immediately",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Safe => write!(f, "safe"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Classify a health factor into `(triggers_alert, severity)`.
///
/// Both thresholds are exclusive-below: a health factor exactly equal to a
/// threshold does not enter that tier.
pub fn classify_severity(
    health_factor: f64,
    alert_threshold: f64,
    critical_threshold: f64,
) -> (bool, Severity) {
    if health_factor < critical_threshold {
        (true, Severity::Critical)
    } else if health_factor < alert_threshold {
        (true, Severity::Warning)
    } else {
        (false, Severity::Safe)
    }
}
