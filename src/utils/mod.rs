//! Shared utilities.

pub mod decimal;

pub use decimal::{round_f64, round_to_precision};
