//! # Lending Sentinel
//!
//! Health factor and liquidation risk monitoring for wallets on
//! Aave V3, Compound V3, Spark and Radiant.
//!
//! ## Architecture
//!
//! - `chain`: Chain identifiers, addresses and the JSON-RPC data provider
//! - `protocol`: Per-protocol adapters that normalize account state
//! - `price`: Tiered USD price resolution (oracles, then CoinGecko)
//! - `risk`: Health factor, liquidation price and severity classification
//! - `monitor`: The end-to-end monitoring pipeline and its report
//! - `config`: Configuration management and validation
//! - `utils`: Shared utilities and decimal rounding

pub mod chain;
pub mod config;
pub mod error;
pub mod monitor;
pub mod price;
pub mod protocol;
pub mod risk;
pub mod utils;

pub use config::Config;
pub use error::{MonitorError, PriceError, ProtocolError, RiskError};
pub use monitor::{MonitorReport, MonitorRequest, MonitorResult, PositionMonitor};
