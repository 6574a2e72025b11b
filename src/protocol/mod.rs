//! Lending protocol adapters.
//!
//! Each adapter reads a wallet's raw account state from one protocol and
//! normalizes it into a [`NormalizedPosition`].
//!
//! ## Aave family
//! Aave V3, Spark and Radiant expose the same `getUserAccountData` shape and
//! share one adapter parameterized by market configuration.
//!
//! ## Compound V3
//! Comet markets are assembled from three separate reads with locally
//! computed health factor.

mod aave;
mod abi;
mod compound;
mod markets;
mod types;

use alloy::sol_types::SolCall;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::chain::{Address, ChainDataProvider, ChainId, ContractCall};
use crate::error::ProtocolError;

pub use aave::{AaveAccountData, AaveMarketConfig, AaveStyleAdapter};
pub use compound::{CometAccountData, CometAdapter};
pub use markets::{market_address, supported_chains};
pub use types::{NormalizedPosition, RawAccountState, SubPosition};

/// Supported lending protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKind {
    AaveV3,
    CompoundV3,
    Spark,
    Radiant,
}

impl ProtocolKind {
    pub const ALL: [ProtocolKind; 4] = [
        ProtocolKind::AaveV3,
        ProtocolKind::CompoundV3,
        ProtocolKind::Spark,
        ProtocolKind::Radiant,
    ];

    /// Identifier used in requests and reports.
    pub fn id(&self) -> &'static str {
        match self {
            ProtocolKind::AaveV3 => "aave_v3",
            ProtocolKind::CompoundV3 => "compound_v3",
            ProtocolKind::Spark => "spark",
            ProtocolKind::Radiant => "radiant",
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProtocolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.id() == wanted)
            .ok_or_else(|| {
                format!(
                    "Invalid protocol: {}. Supported: aave_v3, compound_v3, spark, radiant",
                    s
                )
            })
    }
}

/// Reads and normalizes a wallet's position on one protocol and chain.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    fn protocol(&self) -> ProtocolKind;

    fn chain(&self) -> ChainId;

    /// Fetch raw account state and normalize it.
    ///
    /// Either every read succeeds or the whole fetch fails with
    /// [`ProtocolError::FetchFailed`].
    async fn fetch_and_normalize(
        &self,
        wallet: &Address,
    ) -> Result<NormalizedPosition, ProtocolError>;
}

/// Build the adapter for `(protocol, chain)` and verify the provider can
/// reach the chain.
///
/// The market lookup happens before any network access, so an unsupported
/// pair fails without touching the provider.
pub async fn connect_adapter(
    protocol: ProtocolKind,
    chain: ChainId,
    provider: Arc<dyn ChainDataProvider>,
    deadline: Duration,
) -> Result<Box<dyn ProtocolAdapter>, ProtocolError> {
    let adapter: Box<dyn ProtocolAdapter> = match protocol {
        ProtocolKind::AaveV3 => Box::new(AaveStyleAdapter::new(
            AaveMarketConfig::AAVE_V3,
            chain,
            provider.clone(),
            deadline,
        )?),
        ProtocolKind::Spark => Box::new(AaveStyleAdapter::new(
            AaveMarketConfig::SPARK,
            chain,
            provider.clone(),
            deadline,
        )?),
        ProtocolKind::Radiant => Box::new(AaveStyleAdapter::new(
            AaveMarketConfig::RADIANT,
            chain,
            provider.clone(),
            deadline,
        )?),
        ProtocolKind::CompoundV3 => {
            Box::new(CometAdapter::new(chain, provider.clone(), deadline)?)
        }
    };

    ensure_connected(provider.as_ref(), chain, deadline).await?;

    debug!(protocol = %protocol, chain = %chain, "Protocol adapter ready");
    Ok(adapter)
}

/// Resolve the market contract or fail with `UnsupportedConfiguration`.
fn require_market(protocol: ProtocolKind, chain: ChainId) -> Result<Address, ProtocolError> {
    market_address(protocol, chain)
        .ok_or(ProtocolError::UnsupportedConfiguration { protocol, chain })
}

async fn ensure_connected(
    provider: &dyn ChainDataProvider,
    chain: ChainId,
    deadline: Duration,
) -> Result<(), ProtocolError> {
    match timeout(deadline, provider.check_connection(chain)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            warn!(chain = %chain, error = %e, "Chain connectivity check failed");
            Err(ProtocolError::ConnectionFailure {
                chain,
                reason: format!("{:#}", e),
            })
        }
        Err(_) => {
            warn!(chain = %chain, ?deadline, "Chain connectivity check timed out");
            Err(ProtocolError::ConnectionFailure {
                chain,
                reason: format!("no response within {:?}", deadline),
            })
        }
    }
}

/// Execute one contract read under the deadline and decode its output.
async fn read_call<C: SolCall>(
    provider: &dyn ChainDataProvider,
    chain: ChainId,
    to: Address,
    call: C,
    deadline: Duration,
) -> Result<C::Return, ProtocolError> {
    let call = ContractCall::new(to, &call);

    let output = match timeout(deadline, provider.call(chain, &call)).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(ProtocolError::FetchFailed(format!(
                "{} on {}: {:#}",
                call.function, call.to, e
            )))
        }
        Err(_) => {
            return Err(ProtocolError::FetchFailed(format!(
                "{} on {} timed out after {:?}",
                call.function, call.to, deadline
            )))
        }
    };

    C::abi_decode_returns(&output).map_err(|e| {
        ProtocolError::FetchFailed(format!(
            "{} returned undecodable output ({} bytes): {}",
            call.function,
            output.len(),
            e
        ))
    })
}

/// ABI-encode a tuple of static `uint256` values.
#[cfg(test)]
pub(crate) fn encode_words(values: &[crate::chain::U256]) -> crate::chain::Bytes {
    values
        .iter()
        .flat_map(|value| value.to_be_bytes::<32>())
        .collect::<Vec<u8>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainDataProvider;

    #[test]
    fn test_protocol_parsing() {
        assert_eq!("aave_v3".parse::<ProtocolKind>(), Ok(ProtocolKind::AaveV3));
        assert_eq!(" Compound_V3 ".parse::<ProtocolKind>(), Ok(ProtocolKind::CompoundV3));
        assert!("morpho".parse::<ProtocolKind>().is_err());
        assert_eq!(ProtocolKind::Radiant.to_string(), "radiant");
        assert_eq!(
            serde_json::to_string(&ProtocolKind::CompoundV3).unwrap(),
            "\"compound_v3\""
        );
    }

    #[tokio::test]
    async fn test_unsupported_pair_fails_before_network() {
        let mut provider = MockChainDataProvider::new();
        provider.expect_check_connection().never();
        provider.expect_call().never();
        let provider: Arc<dyn ChainDataProvider> = Arc::new(provider);

        let result = connect_adapter(
            ProtocolKind::Spark,
            ChainId::Polygon,
            provider,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(
            result.err(),
            Some(ProtocolError::UnsupportedConfiguration {
                protocol: ProtocolKind::Spark,
                chain: ChainId::Polygon,
            })
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_connection_failure() {
        let mut provider = MockChainDataProvider::new();
        provider
            .expect_check_connection()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));
        let provider: Arc<dyn ChainDataProvider> = Arc::new(provider);

        let result = connect_adapter(
            ProtocolKind::AaveV3,
            ChainId::Ethereum,
            provider,
            Duration::from_secs(1),
        )
        .await;

        match result.err() {
            Some(ProtocolError::ConnectionFailure { chain, reason }) => {
                assert_eq!(chain, ChainId::Ethereum);
                assert!(reason.contains("connection refused"));
            }
            other => panic!("expected connection failure, got {:?}", other),
        }
    }

    struct StalledProvider;

    #[async_trait]
    impl ChainDataProvider for StalledProvider {
        async fn check_connection(&self, _chain: ChainId) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }

        async fn call(
            &self,
            _chain: ChainId,
            _call: &ContractCall,
        ) -> anyhow::Result<crate::chain::Bytes> {
            anyhow::bail!("not reached")
        }
    }

    #[tokio::test]
    async fn test_stalled_connectivity_check_is_connection_failure() {
        let result = connect_adapter(
            ProtocolKind::AaveV3,
            ChainId::Optimism,
            Arc::new(StalledProvider),
            Duration::from_millis(50),
        )
        .await;

        match result.err() {
            Some(ProtocolError::ConnectionFailure { chain, reason }) => {
                assert_eq!(chain, ChainId::Optimism);
                assert!(reason.contains("no response within"));
            }
            other => panic!("expected connection failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_each_protocol_on_supported_chain() {
        for (protocol, chain) in [
            (ProtocolKind::AaveV3, ChainId::Base),
            (ProtocolKind::CompoundV3, ChainId::Arbitrum),
            (ProtocolKind::Spark, ChainId::Ethereum),
            (ProtocolKind::Radiant, ChainId::Bsc),
        ] {
            let mut provider = MockChainDataProvider::new();
            provider.expect_check_connection().times(1).returning(|_| Ok(()));
            let provider: Arc<dyn ChainDataProvider> = Arc::new(provider);

            let adapter = connect_adapter(protocol, chain, provider, Duration::from_secs(1))
                .await
                .unwrap();
            assert_eq!(adapter.protocol(), protocol);
            assert_eq!(adapter.chain(), chain);
        }
    }
}
