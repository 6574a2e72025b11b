//! Presentation record for a monitoring result.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::MonitorResult;
use crate::protocol::{ProtocolKind, SubPosition};
use crate::risk::Severity;
use crate::utils::round_f64;

/// Rounded, serializable view of a [`MonitorResult`].
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
    pub wallet: String,
    pub protocol: ProtocolKind,
    pub chain_id: u64,
    pub chain_name: &'static str,
    /// Current health factor (< 1.0 = liquidatable)
    #[serde(serialize_with = "serialize_unbounded")]
    pub health_factor: f64,
    /// Liquidation price threshold for the primary collateral
    #[serde(rename = "liq_price")]
    pub liquidation_price: Option<f64>,
    #[serde(serialize_with = "serialize_unbounded")]
    pub buffer_percent: f64,
    pub alert_threshold_hit: bool,
    pub severity: Severity,
    pub total_collateral_usd: f64,
    pub total_debt_usd: f64,
    pub available_borrows_usd: f64,
    pub liquidation_threshold: f64,
    pub ltv: f64,
    pub collateral_price_usd: Option<f64>,
    #[serde(rename = "positions")]
    pub sub_positions: Vec<SubPosition>,
    pub timestamp: DateTime<Utc>,
}

impl MonitorReport {
    /// Build a report stamped with the current time.
    pub fn from_result(result: &MonitorResult) -> Self {
        Self::at(result, Utc::now())
    }

    /// Build a report with an explicit timestamp.
    pub fn at(result: &MonitorResult, timestamp: DateTime<Utc>) -> Self {
        let position = &result.position;
        let assessment = &result.assessment;

        Self {
            wallet: result.wallet.to_string(),
            protocol: result.protocol,
            chain_id: result.chain.id(),
            chain_name: result.chain.name(),
            health_factor: round_f64(assessment.health_factor, 4),
            liquidation_price: assessment.liquidation_price.filter(|price| price.is_finite()),
            buffer_percent: round_f64(assessment.buffer_percent, 2),
            alert_threshold_hit: assessment.triggers_alert,
            severity: assessment.severity,
            total_collateral_usd: round_f64(position.total_collateral_usd, 2),
            total_debt_usd: round_f64(position.total_debt_usd, 2),
            available_borrows_usd: round_f64(position.available_borrows_usd, 2),
            liquidation_threshold: round_f64(position.liquidation_threshold, 4),
            ltv: round_f64(position.ltv, 4),
            collateral_price_usd: result.collateral_price.as_ref().map(|q| q.usd),
            sub_positions: position.sub_positions.clone(),
            timestamp,
        }
    }
}

/// JSON has no infinity; an unbounded ratio is written as `"Infinity"`.
fn serialize_unbounded<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_infinite() && value.is_sign_positive() {
        serializer.serialize_str("Infinity")
    } else {
        serializer.serialize_f64(*value)
    }
}
