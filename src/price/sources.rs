//! Built-in price source tiers.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::coingecko::{coingecko_id, CoinGeckoClient};
use super::{PriceContext, PriceSource};

/// Primary on-chain oracle tier.
///
/// Only applicable when the context carries both a token address and a
/// chain. No feed registry is wired in yet, so it always falls through.
#[derive(Debug, Default)]
pub struct OnChainOracleSource;

#[async_trait]
impl PriceSource for OnChainOracleSource {
    fn name(&self) -> &'static str {
        "onchain_oracle"
    }

    async fn lookup(&self, symbol: &str, context: &PriceContext) -> Option<f64> {
        if context.token_address.is_none() || context.chain.is_none() {
            return None;
        }
        debug!(symbol, "On-chain oracle feeds not configured, falling through");
        None
    }
}

/// Protocol-native oracle tier. Always falls through for now.
#[derive(Debug, Default)]
pub struct ProtocolOracleSource;

#[async_trait]
impl PriceSource for ProtocolOracleSource {
    fn name(&self) -> &'static str {
        "protocol_oracle"
    }

    async fn lookup(&self, symbol: &str, _context: &PriceContext) -> Option<f64> {
        debug!(symbol, "Protocol oracle not configured, falling through");
        None
    }
}

/// External aggregator tier backed by CoinGecko.
#[derive(Debug, Clone)]
pub struct AggregatorSource {
    client: CoinGeckoClient,
}

impl AggregatorSource {
    pub fn new(client: CoinGeckoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PriceSource for AggregatorSource {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    async fn lookup(&self, symbol: &str, context: &PriceContext) -> Option<f64> {
        self.lookup_many(&[symbol.to_string()], context)
            .await
            .remove(symbol)
    }

    /// One batched request for every mapped symbol. Unmapped symbols are
    /// skipped without a request.
    async fn lookup_many(
        &self,
        symbols: &[String],
        _context: &PriceContext,
    ) -> HashMap<String, f64> {
        // coin id -> requesting symbols (WETH and ETH share an id)
        let mut wanted: HashMap<&'static str, Vec<&String>> = HashMap::new();
        for symbol in symbols {
            match coingecko_id(symbol) {
                Some(id) => wanted.entry(id).or_default().push(symbol),
                None => warn!(symbol = %symbol, "No CoinGecko id mapping"),
            }
        }

        if wanted.is_empty() {
            return HashMap::new();
        }

        let mut ids: Vec<&str> = wanted.keys().copied().collect();
        ids.sort_unstable();

        let prices = match self.client.simple_price(&ids).await {
            Ok(prices) => prices,
            Err(e) => {
                warn!(error = %e, "CoinGecko lookup failed");
                return HashMap::new();
            }
        };

        let mut resolved = HashMap::new();
        for (id, requesting) in wanted {
            if let Some(usd) = prices.get(id) {
                for symbol in requesting {
                    resolved.insert(symbol.clone(), *usd);
                }
            }
        }
        resolved
    }
}
