//! CoinGecko simple-price client.
//!
//! Read-only USD quotes by CoinGecko coin id. Ids missing from the response
//! are simply absent from the returned map.

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::PriceConfig;

/// Base URL for the public CoinGecko API.
const PUBLIC_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Token symbol to CoinGecko coin id.
const COINGECKO_IDS: &[(&str, &str)] = &[
    ("ETH", "ethereum"),
    ("WETH", "ethereum"),
    ("MATIC", "matic-network"),
    ("WMATIC", "matic-network"),
    ("USDC", "usd-coin"),
    ("USDT", "tether"),
    ("DAI", "dai"),
    ("WBTC", "wrapped-bitcoin"),
    ("LINK", "chainlink"),
    ("AAVE", "aave"),
    ("CRV", "curve-dao-token"),
    ("UNI", "uniswap"),
    ("SUSHI", "sushi"),
    ("AVAX", "avalanche-2"),
    ("WAVAX", "avalanche-2"),
    ("BNB", "binancecoin"),
    ("WBNB", "binancecoin"),
];

/// CoinGecko id for a token symbol (case-insensitive).
pub fn coingecko_id(symbol: &str) -> Option<&'static str> {
    let symbol = symbol.trim();
    COINGECKO_IDS
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
        .map(|(_, id)| *id)
}

/// CoinGecko API client.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    /// Create a client for the public API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(PUBLIC_API_URL, None)
    }

    pub fn from_config(config: &PriceConfig) -> Result<Self> {
        Self::with_base_url(&config.api_base_url, config.api_key.clone())
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Get USD prices for a batch of coin ids.
    /// Returns a map of coin id -> USD price for the ids the API resolved.
    #[instrument(skip(self), name = "cg_simple_price")]
    pub async fn simple_price(&self, ids: &[&str]) -> Result<HashMap<String, f64>> {
        let url = format!("{}/simple/price", self.base_url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("ids", ids.join(",").as_str()), ("vs_currencies", "usd")]);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request
            .send()
            .await
            .context("Failed to send simple/price request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CoinGecko API error {}: {}", status, body);
        }

        let data: HashMap<String, Value> = response
            .json()
            .await
            .context("Failed to parse simple/price response")?;

        // Entries without a numeric usd field are skipped individually
        let prices: HashMap<String, f64> = data
            .into_iter()
            .filter_map(|(id, entry)| {
                let usd = entry.get("usd").and_then(Value::as_f64)?;
                Some((id, usd))
            })
            .collect();

        debug!("Fetched {} of {} prices from CoinGecko", prices.len(), ids.len());
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_symbol_mapping_is_case_insensitive() {
        assert_eq!(coingecko_id("eth"), Some("ethereum"));
        assert_eq!(coingecko_id("WETH"), Some("ethereum"));
        assert_eq!(coingecko_id("Wavax"), Some("avalanche-2"));
        assert_eq!(coingecko_id("UNKNOWNXYZ"), None);
    }

    #[tokio::test]
    async fn test_simple_price_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "ethereum,usd-coin"))
            .and(query_param("vs_currencies", "usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ethereum": {"usd": 3150.25},
                "usd-coin": {"usd": 0.9998}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CoinGeckoClient::with_base_url(&server.uri(), None).unwrap();
        let prices = client.simple_price(&["ethereum", "usd-coin"]).await.unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(prices["ethereum"], 3150.25);
        assert_eq!(prices["usd-coin"], 0.9998);
    }

    #[tokio::test]
    async fn test_entries_without_usd_are_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ethereum": {"usd": 3000.0},
                "dai": {}
            })))
            .mount(&server)
            .await;

        let client = CoinGeckoClient::with_base_url(&server.uri(), None).unwrap();
        let prices = client.simple_price(&["ethereum", "dai", "tether"]).await.unwrap();

        assert_eq!(prices.len(), 1);
        assert!(prices.contains_key("ethereum"));
    }

    #[tokio::test]
    async fn test_malformed_entry_does_not_drop_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ethereum": {"usd": 3000.0},
                "dai": {"usd": "n/a"},
                "tether": []
            })))
            .mount(&server)
            .await;

        let client = CoinGeckoClient::with_base_url(&server.uri(), None).unwrap();
        let prices = client.simple_price(&["ethereum", "dai", "tether"]).await.unwrap();

        assert_eq!(prices.len(), 1);
        assert_eq!(prices["ethereum"], 3000.0);
    }

    #[tokio::test]
    async fn test_api_key_header_and_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("x-cg-demo-api-key", "demo-key"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            CoinGeckoClient::with_base_url(&server.uri(), Some("demo-key".to_string())).unwrap();
        let err = client.simple_price(&["ethereum"]).await.unwrap_err();

        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_fetch() {
        let client = CoinGeckoClient::new().unwrap();
        let prices = client.simple_price(&["ethereum"]).await.unwrap();

        assert!(prices["ethereum"] > 0.0);
        println!("ETH: ${}", prices["ethereum"]);
    }
}
