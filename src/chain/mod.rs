//! Chain access layer.
//!
//! ## Types
//! Chain ids plus the `alloy` address and 256-bit integer primitives used
//! by every contract read.
//!
//! ## Provider
//! [`ChainDataProvider`] is the only way the core touches a chain. The
//! default [`JsonRpcProvider`] wraps an `alloy` HTTP provider.

mod provider;
mod rpc;
mod types;

pub use alloy::primitives::{Address, Bytes, U256};

#[cfg(test)]
pub use provider::MockChainDataProvider;
pub use provider::{ChainDataProvider, ContractCall};
pub use rpc::JsonRpcProvider;
pub use types::{scale_down, ChainId};
