//! Decimal rounding helpers for presentation.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Round a decimal to a specific number of decimal places.
pub fn round_to_precision(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp(decimals)
}

/// Round an `f64` through `Decimal` (banker's rounding, no binary drift).
///
/// Values `Decimal` cannot represent (infinities, NaN, magnitudes beyond
/// ~7.9e28) are returned unchanged.
pub fn round_f64(value: f64, decimals: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| round_to_precision(d, decimals))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_to_precision() {
        assert_eq!(round_to_precision(dec!(1.23456), 4), dec!(1.2346));
        assert_eq!(round_to_precision(dec!(5000.005), 2), dec!(5000.00));
    }

    #[test]
    fn test_round_f64() {
        assert_eq!(round_f64(1.649999999, 4), 1.65);
        assert_eq!(round_f64(64.99999999999999, 2), 65.0);
        assert_eq!(round_f64(2500.0, 2), 2500.0);
    }

    #[test]
    fn test_round_f64_passes_through_unrepresentable() {
        assert_eq!(round_f64(f64::INFINITY, 4), f64::INFINITY);
        assert!(round_f64(f64::NAN, 4).is_nan());
        assert_eq!(round_f64(1e77, 2), 1e77);
    }
}
