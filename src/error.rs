//! Error types for the lending sentinel.

use thiserror::Error;

use crate::chain::ChainId;
use crate::protocol::ProtocolKind;

/// Protocol adapter construction and fetch errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("{protocol} has no market registered on {chain}")]
    UnsupportedConfiguration {
        protocol: ProtocolKind,
        chain: ChainId,
    },

    #[error("Connection to {chain} failed: {reason}")]
    ConnectionFailure { chain: ChainId, reason: String },

    #[error("Fetch failed: {0}")]
    FetchFailed(String),
}

/// Price resolution errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    #[error("No price source produced a quote for {symbol}")]
    Unavailable { symbol: String },
}

/// Risk calculation input errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Outcome of a monitoring request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported chain id: {0}")]
    UnsupportedChain(u64),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Price(#[from] PriceError),
}
