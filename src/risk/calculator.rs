//! Health factor, liquidation price and buffer formulas.
//!
//! All functions are pure and deterministic.

use crate::error::RiskError;

/// Default liquidation bonus (5% to the liquidator).
pub const DEFAULT_LIQUIDATION_BONUS: f64 = 1.05;

/// Calculate the health factor.
///
/// HF = (collateral * liquidation_threshold) / debt, or +inf without debt.
///
/// # Errors
/// Rejects negative or NaN amounts and thresholds outside `[0, 1]`.
pub fn health_factor(
    collateral_usd: f64,
    debt_usd: f64,
    liquidation_threshold: f64,
) -> Result<f64, RiskError> {
    if collateral_usd.is_nan() || collateral_usd < 0.0 {
        return Err(RiskError::InvalidInput(format!(
            "collateral must be non-negative, got {}",
            collateral_usd
        )));
    }
    if debt_usd.is_nan() || debt_usd < 0.0 {
        return Err(RiskError::InvalidInput(format!(
            "debt must be non-negative, got {}",
            debt_usd
        )));
    }
    if !(0.0..=1.0).contains(&liquidation_threshold) {
        return Err(RiskError::InvalidInput(format!(
            "liquidation threshold must be within [0, 1], got {}",
            liquidation_threshold
        )));
    }

    if debt_usd == 0.0 {
        return Ok(f64::INFINITY);
    }

    Ok((collateral_usd * liquidation_threshold) / debt_usd)
}

/// Calculate the collateral price at which a single-asset position
/// becomes liquidatable.
///
/// The bonus divides the threshold:
/// `price = (debt * debt_price) / (collateral * threshold / bonus)`.
/// Returns 0 when there is no collateral and `+inf` when the effective
/// threshold is zero; callers treat a non-finite price as absent.
pub fn liquidation_price(
    collateral_amount: f64,
    debt_amount: f64,
    debt_price_usd: f64,
    liquidation_threshold: f64,
    liquidation_bonus: f64,
) -> f64 {
    if collateral_amount == 0.0 {
        return 0.0;
    }

    let effective_threshold = liquidation_threshold / liquidation_bonus;

    (debt_amount * debt_price_usd) / (collateral_amount * effective_threshold)
}

/// Safety buffer above liquidation, as a percentage.
///
/// Positions at or below HF 1.0 report zero rather than a negative buffer.
pub fn buffer_percent(health_factor: f64) -> f64 {
    if health_factor > 1.0 {
        ((health_factor - 1.0) / 1.0) * 100.0
    } else {
        0.0
    }
}
