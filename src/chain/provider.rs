//! Read-only chain access used by the protocol adapters.
//!
//! The adapters only describe *what* to read (contract plus ABI-encoded
//! call); transport, node selection and connection handling belong to the
//! [`ChainDataProvider`] implementation.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use super::types::ChainId;

/// A single read-only contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Target contract
    pub to: Address,
    /// Solidity function signature, e.g. `getUserAccountData(address)`
    pub function: &'static str,
    /// Selector followed by the ABI-encoded arguments
    pub input: Bytes,
}

impl ContractCall {
    pub fn new<C: SolCall>(to: Address, call: &C) -> Self {
        Self {
            to,
            function: C::SIGNATURE,
            input: Bytes::from(call.abi_encode()),
        }
    }
}

/// Capability to perform read-only contract calls on a chain.
///
/// Implementations own transport concerns (endpoints, connection reuse,
/// rate limiting). Errors are reported as `anyhow` errors with context;
/// callers map them into their own outcome types.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    /// Verify the provider can reach the given chain.
    async fn check_connection(&self, chain: ChainId) -> anyhow::Result<()>;

    /// Execute a read-only call and return the raw ABI-encoded output.
    async fn call(&self, chain: ChainId, call: &ContractCall) -> anyhow::Result<Bytes>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use alloy::sol;

    sol! {
        function balanceOf(address owner) external view returns (uint256);
    }

    #[test]
    fn test_call_encoding() {
        let token = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        let owner = address!("00000000000000000000000000000000000000aa");

        let call = ContractCall::new(token, &balanceOfCall { owner });

        assert_eq!(call.to, token);
        assert_eq!(call.function, "balanceOf(address)");
        assert_eq!(call.input.len(), 36);
        assert_eq!(&call.input[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(call.input[35], 0xaa);
        assert!(call.input[4..35].iter().all(|b| *b == 0));
    }
}
