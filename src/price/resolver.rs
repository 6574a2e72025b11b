//! Tiered price resolution.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use super::sources::{AggregatorSource, OnChainOracleSource, ProtocolOracleSource};
use super::{CoinGeckoClient, PriceContext, PriceQuote, PriceSource};
use crate::config::Config;
use crate::error::PriceError;

/// Resolves symbols to USD through an ordered list of sources.
#[derive(Clone)]
pub struct PriceResolver {
    tiers: Vec<Arc<dyn PriceSource>>,
    deadline: Duration,
}

fn usable(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

impl PriceResolver {
    /// Create a resolver over explicit tiers, tried in order.
    pub fn new(tiers: Vec<Arc<dyn PriceSource>>, deadline: Duration) -> Self {
        Self { tiers, deadline }
    }

    /// Standard chain: on-chain oracle, protocol oracle, CoinGecko.
    pub fn with_aggregator(client: CoinGeckoClient, deadline: Duration) -> Self {
        Self::new(
            vec![
                Arc::new(OnChainOracleSource),
                Arc::new(ProtocolOracleSource),
                Arc::new(AggregatorSource::new(client)),
            ],
            deadline,
        )
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = CoinGeckoClient::from_config(&config.price)?;
        Ok(Self::with_aggregator(client, config.timeouts.price_deadline()))
    }

    /// Resolve a single symbol, short-circuiting on the first tier with a
    /// usable price.
    #[instrument(skip(self, context))]
    pub async fn resolve(
        &self,
        symbol: &str,
        context: &PriceContext,
    ) -> Result<PriceQuote, PriceError> {
        let symbol = normalize_symbol(symbol);

        for tier in &self.tiers {
            match timeout(self.deadline, tier.lookup(&symbol, context)).await {
                Ok(Some(usd)) if usable(usd) => {
                    info!(symbol = %symbol, source = tier.name(), usd, "Resolved price");
                    return Ok(PriceQuote { symbol, usd });
                }
                Ok(_) => debug!(symbol = %symbol, source = tier.name(), "No price, trying next tier"),
                Err(_) => warn!(symbol = %symbol, source = tier.name(), "Price lookup timed out"),
            }
        }

        warn!(symbol = %symbol, "Failed to get price from any source");
        Err(PriceError::Unavailable { symbol })
    }

    /// Resolve several symbols. Symbols no tier could price are left out
    /// of the result; the batch itself never fails.
    #[instrument(skip(self, context))]
    pub async fn resolve_many(
        &self,
        symbols: &[&str],
        context: &PriceContext,
    ) -> HashMap<String, PriceQuote> {
        let mut pending: Vec<String> = Vec::new();
        for symbol in symbols.iter().map(|s| normalize_symbol(s)) {
            if !pending.contains(&symbol) {
                pending.push(symbol);
            }
        }

        let mut quotes = HashMap::new();
        for tier in &self.tiers {
            if pending.is_empty() {
                break;
            }

            let found = match timeout(self.deadline, tier.lookup_many(&pending, context)).await {
                Ok(found) => found,
                Err(_) => {
                    warn!(source = tier.name(), "Batch price lookup timed out");
                    continue;
                }
            };

            pending.retain(|symbol| match found.get(symbol) {
                Some(&usd) if usable(usd) => {
                    quotes.insert(
                        symbol.clone(),
                        PriceQuote {
                            symbol: symbol.clone(),
                            usd,
                        },
                    );
                    false
                }
                _ => true,
            });
        }

        if !pending.is_empty() {
            warn!(unresolved = ?pending, "Some symbols have no price");
        }
        info!("Resolved {} of {} prices", quotes.len(), quotes.len() + pending.len());
        quotes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Source with a fixed price table that counts its calls.
    struct FixedSource {
        prices: HashMap<String, f64>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(prices: &[(&str, f64)]) -> Arc<Self> {
            Arc::new(Self {
                prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PriceSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn lookup(&self, symbol: &str, _context: &PriceContext) -> Option<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prices.get(symbol).copied()
        }
    }

    struct StalledSource;

    #[async_trait]
    impl PriceSource for StalledSource {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn lookup(&self, _symbol: &str, _context: &PriceContext) -> Option<f64> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Some(1.0)
        }
    }

    async fn coingecko(server: &MockServer) -> PriceResolver {
        let client = CoinGeckoClient::with_base_url(&server.uri(), None).unwrap();
        PriceResolver::with_aggregator(client, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_first_tier_short_circuits() {
        let first = FixedSource::new(&[("ETH", 3000.0)]);
        let second = FixedSource::new(&[("ETH", 9999.0)]);
        let resolver = PriceResolver::new(
            vec![first.clone(), second.clone()],
            Duration::from_secs(1),
        );

        let quote = resolver.resolve("eth", &PriceContext::default()).await.unwrap();

        assert_eq!(quote, PriceQuote { symbol: "ETH".to_string(), usd: 3000.0 });
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_through_unusable_prices() {
        let broken = FixedSource::new(&[("DAI", 0.0)]);
        let good = FixedSource::new(&[("DAI", 1.0)]);
        let resolver = PriceResolver::new(vec![broken, good], Duration::from_secs(1));

        let quote = resolver.resolve("DAI", &PriceContext::default()).await.unwrap();
        assert_eq!(quote.usd, 1.0);
    }

    #[tokio::test]
    async fn test_all_tiers_empty_is_unavailable() {
        let resolver = PriceResolver::new(
            vec![Arc::new(OnChainOracleSource), Arc::new(ProtocolOracleSource)],
            Duration::from_secs(1),
        );

        let result = resolver.resolve("eth", &PriceContext::default()).await;
        assert_eq!(
            result,
            Err(PriceError::Unavailable { symbol: "ETH".to_string() })
        );
    }

    #[tokio::test]
    async fn test_stalled_tier_is_skipped_after_deadline() {
        let fallback = FixedSource::new(&[("LINK", 14.2)]);
        let resolver = PriceResolver::new(
            vec![Arc::new(StalledSource), fallback],
            Duration::from_millis(50),
        );

        let quote = resolver.resolve("LINK", &PriceContext::default()).await.unwrap();
        assert_eq!(quote.usd, 14.2);
    }

    #[tokio::test]
    async fn test_resolve_via_aggregator() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "ethereum"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ethereum": {"usd": 3150.5}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let resolver = coingecko(&server).await;
        let quote = resolver.resolve("weth", &PriceContext::default()).await.unwrap();

        assert_eq!(quote.symbol, "WETH");
        assert_eq!(quote.usd, 3150.5);
    }

    #[tokio::test]
    async fn test_unmapped_symbol_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let resolver = coingecko(&server).await;
        let result = resolver.resolve("UNKNOWNXYZ", &PriceContext::default()).await;

        assert!(matches!(result, Err(PriceError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_batch_drops_unknown_symbols() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "ethereum"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ethereum": {"usd": 3000.0}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let resolver = coingecko(&server).await;
        let quotes = resolver
            .resolve_many(&["ETH", "UNKNOWNXYZ"], &PriceContext::default())
            .await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes["ETH"].usd, 3000.0);
    }

    #[tokio::test]
    async fn test_batch_tolerates_partial_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "ethereum,usd-coin,wrapped-bitcoin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ethereum": {"usd": 3000.0},
                "wrapped-bitcoin": {"usd": 64000.0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = coingecko(&server).await;
        let quotes = resolver
            .resolve_many(&["ETH", "weth", "USDC", "WBTC", "eth"], &PriceContext::default())
            .await;

        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes["ETH"].usd, 3000.0);
        assert_eq!(quotes["WETH"].usd, 3000.0);
        assert_eq!(quotes["WBTC"].usd, 64000.0);
        assert!(!quotes.contains_key("USDC"));
    }

    #[tokio::test]
    async fn test_batch_survives_aggregator_outage() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let resolver = coingecko(&server).await;
        let quotes = resolver.resolve_many(&["ETH", "DAI"], &PriceContext::default()).await;

        assert!(quotes.is_empty());
    }
}
