//! USD price resolution.
//!
//! Prices come from an ordered chain of [`PriceSource`] tiers:
//! 1. On-chain primary oracle (needs token address and chain)
//! 2. Protocol-native oracle
//! 3. External aggregator (CoinGecko) by symbol
//!
//! The first tier that produces a quote wins. Quotes are never cached.

mod coingecko;
mod resolver;
mod sources;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashMap;

use crate::chain::{Address, ChainId};

pub use coingecko::{coingecko_id, CoinGeckoClient};
pub use resolver::PriceResolver;
pub use sources::{AggregatorSource, OnChainOracleSource, ProtocolOracleSource};

/// A USD price for a token symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub usd: f64,
}

/// Optional hints for sources that look prices up by token address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceContext {
    pub token_address: Option<Address>,
    pub chain: Option<ChainId>,
}

impl PriceContext {
    pub fn on_chain(chain: ChainId) -> Self {
        Self {
            token_address: None,
            chain: Some(chain),
        }
    }

    pub fn with_token(mut self, token_address: Address) -> Self {
        self.token_address = Some(token_address);
        self
    }
}

/// One tier of the price fallback chain.
///
/// Sources report "no price" as `None`; failures are logged by the source
/// and never abort the chain.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Source name for logs.
    fn name(&self) -> &'static str;

    /// USD price for an upper-cased symbol.
    async fn lookup(&self, symbol: &str, context: &PriceContext) -> Option<f64>;

    /// USD prices for several symbols. Symbols without a price are absent.
    ///
    /// The default looks symbols up concurrently one by one; batch-capable
    /// sources override this.
    async fn lookup_many(
        &self,
        symbols: &[String],
        context: &PriceContext,
    ) -> HashMap<String, f64> {
        let lookups = symbols.iter().map(|symbol| async move {
            (symbol.clone(), self.lookup(symbol, context).await)
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(symbol, price)| price.map(|p| (symbol, p)))
            .collect()
    }
}
