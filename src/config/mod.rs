//! Configuration management for the lending sentinel.
//!
//! Loads settings from an optional `config` file and `SENTINEL__*`
//! environment variables. The resulting [`Config`] is passed explicitly to
//! the provider and monitor; nothing in the core reads the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::chain::ChainId;

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoints per chain
    #[serde(default)]
    pub rpc: RpcConfig,
    /// External price aggregator settings
    #[serde(default)]
    pub price: PriceConfig,
    /// Severity thresholds and liquidation parameters
    #[serde(default)]
    pub risk: RiskConfig,
    /// Deadlines applied to every external call
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_ethereum_rpc")]
    pub ethereum: String,
    #[serde(default = "default_polygon_rpc")]
    pub polygon: String,
    #[serde(default = "default_arbitrum_rpc")]
    pub arbitrum: String,
    #[serde(default = "default_optimism_rpc")]
    pub optimism: String,
    #[serde(default = "default_base_rpc")]
    pub base: String,
    #[serde(default = "default_avalanche_rpc")]
    pub avalanche: String,
    #[serde(default = "default_bsc_rpc")]
    pub bsc: String,
}

impl RpcConfig {
    /// Endpoint URL for a chain.
    pub fn endpoint(&self, chain: ChainId) -> &str {
        match chain {
            ChainId::Ethereum => &self.ethereum,
            ChainId::Polygon => &self.polygon,
            ChainId::Arbitrum => &self.arbitrum,
            ChainId::Optimism => &self.optimism,
            ChainId::Base => &self.base,
            ChainId::Avalanche => &self.avalanche,
            ChainId::Bsc => &self.bsc,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    /// Base URL of the CoinGecko-compatible aggregator API
    #[serde(default = "default_price_api_url")]
    pub api_base_url: String,
    /// Optional demo/pro API key sent as `x-cg-demo-api-key`
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Health factor below which an alert fires
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,
    /// Health factor below which severity is critical
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,
    /// Liquidation bonus multiplier (1.05 = 5% bonus)
    #[serde(default = "default_liquidation_bonus")]
    pub liquidation_bonus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Deadline for connectivity checks and contract reads
    #[serde(default = "default_chain_timeout")]
    pub chain_secs: u64,
    /// Deadline for each price tier lookup
    #[serde(default = "default_price_timeout")]
    pub price_secs: u64,
}

impl TimeoutConfig {
    pub fn chain_deadline(&self) -> Duration {
        Duration::from_secs(self.chain_secs)
    }

    pub fn price_deadline(&self) -> Duration {
        Duration::from_secs(self.price_secs)
    }
}

// Default value functions
fn default_ethereum_rpc() -> String {
    "https://eth.llamarpc.com".to_string()
}

fn default_polygon_rpc() -> String {
    "https://polygon.llamarpc.com".to_string()
}

fn default_arbitrum_rpc() -> String {
    "https://arbitrum.llamarpc.com".to_string()
}

fn default_optimism_rpc() -> String {
    "https://optimism.llamarpc.com".to_string()
}

fn default_base_rpc() -> String {
    "https://base.llamarpc.com".to_string()
}

fn default_avalanche_rpc() -> String {
    "https://avalanche.llamarpc.com".to_string()
}

fn default_bsc_rpc() -> String {
    "https://binance.llamarpc.com".to_string()
}

fn default_price_api_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_alert_threshold() -> f64 {
    1.2 // 20% buffer above liquidation
}

fn default_critical_threshold() -> f64 {
    1.05
}

fn default_liquidation_bonus() -> f64 {
    1.05
}

fn default_chain_timeout() -> u64 {
    15
}

fn default_price_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("SENTINEL"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.risk.critical_threshold > 0.0
                && self.risk.critical_threshold <= self.risk.alert_threshold,
            "critical_threshold must be positive and <= alert_threshold"
        );

        anyhow::ensure!(
            self.risk.liquidation_bonus >= 1.0,
            "liquidation_bonus must be >= 1.0"
        );

        anyhow::ensure!(
            self.timeouts.chain_secs > 0 && self.timeouts.price_secs > 0,
            "timeouts must be non-zero"
        );

        for chain in ChainId::ALL {
            let url = self.rpc.endpoint(chain);
            anyhow::ensure!(
                url.starts_with("http://") || url.starts_with("https://"),
                "RPC endpoint for {} must be an http(s) URL",
                chain
            );
        }

        Ok(())
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            ethereum: default_ethereum_rpc(),
            polygon: default_polygon_rpc(),
            arbitrum: default_arbitrum_rpc(),
            optimism: default_optimism_rpc(),
            base: default_base_rpc(),
            avalanche: default_avalanche_rpc(),
            bsc: default_bsc_rpc(),
        }
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_price_api_url(),
            api_key: None,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            alert_threshold: default_alert_threshold(),
            critical_threshold: default_critical_threshold(),
            liquidation_bonus: default_liquidation_bonus(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            chain_secs: default_chain_timeout(),
            price_secs: default_price_timeout(),
        }
    }
}
