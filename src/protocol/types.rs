//! Protocol-independent position representation.

use serde::Serialize;

use super::aave::AaveAccountData;
use super::compound::CometAccountData;
use crate::error::ProtocolError;

/// Per-asset entry of a position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubPosition {
    /// Asset symbol or token address
    pub asset: String,
    pub collateral_usd: f64,
    pub debt_usd: f64,
}

/// Account state normalized to USD figures and fractional thresholds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPosition {
    pub total_collateral_usd: f64,
    pub total_debt_usd: f64,
    /// Weighted liquidation threshold as a fraction (0.825 = 82.5%)
    pub liquidation_threshold: f64,
    /// Weighted loan-to-value as a fraction
    pub ltv: f64,
    /// Health factor, `+inf` when the account has no debt
    pub health_factor: f64,
    pub available_borrows_usd: f64,
    /// Per-asset breakdown (empty in the aggregate model)
    pub sub_positions: Vec<SubPosition>,
}

impl NormalizedPosition {
    /// Whether the account carries both collateral and debt.
    pub fn is_leveraged(&self) -> bool {
        self.total_debt_usd > 0.0 && self.total_collateral_usd > 0.0
    }
}

/// Raw account state exactly as read from the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAccountState {
    Aave(AaveAccountData),
    Comet(CometAccountData),
}

impl RawAccountState {
    /// Apply the protocol's decimal scaling rules.
    pub fn normalize(&self) -> Result<NormalizedPosition, ProtocolError> {
        match self {
            RawAccountState::Aave(data) => data.normalize(),
            RawAccountState::Comet(data) => data.normalize(),
        }
    }
}
