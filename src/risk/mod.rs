//! Liquidation risk calculations.
//!
//! Pure functions shared by every protocol:
//! - Health factor from collateral, debt and liquidation threshold
//! - Single-asset liquidation price with liquidation bonus
//! - Safety buffer percentage
//! - Severity classification (safe / warning / critical)

mod calculator;
mod severity;

use serde::Serialize;

pub use calculator::{buffer_percent, health_factor, liquidation_price, DEFAULT_LIQUIDATION_BONUS};
pub use severity::{
    classify_severity, Severity, DEFAULT_ALERT_THRESHOLD, DEFAULT_CRITICAL_THRESHOLD,
};

/// Risk figures derived from a normalized position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// Health factor, `+inf` when the position has no debt
    pub health_factor: f64,
    /// Collateral price that triggers liquidation, absent when the position
    /// has no debt or no collateral
    pub liquidation_price: Option<f64>,
    /// Safety buffer above HF 1.0 in percent, never negative
    pub buffer_percent: f64,
    pub severity: Severity,
    /// Whether the health factor is below the alert threshold
    pub triggers_alert: bool,
}
