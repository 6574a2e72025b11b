//! Position monitoring pipeline.
//!
//! The [`PositionMonitor`] is the single entry point for a risk query:
//! validate the request, connect the protocol adapter, normalize the
//! account, optionally price the collateral, then assess risk.

mod report;

use anyhow::Result;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::chain::{Address, ChainDataProvider, ChainId, JsonRpcProvider};
use crate::config::{Config, RiskConfig};
use crate::error::MonitorError;
use crate::price::{PriceContext, PriceQuote, PriceResolver};
use crate::protocol::{connect_adapter, NormalizedPosition, ProtocolKind};
use crate::risk::{self, RiskAssessment};

pub use report::MonitorReport;

/// Debt is assumed to be a USD stablecoin.
const DEBT_PRICE_USD: f64 = 1.0;

/// A single monitoring query.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorRequest {
    pub wallet: String,
    pub protocol: ProtocolKind,
    pub chain_id: u64,
    /// Dominant collateral asset; when set, the liquidation price is quoted
    /// in USD per unit of this asset
    pub collateral_symbol: Option<String>,
}

impl MonitorRequest {
    pub fn new(wallet: impl Into<String>, protocol: ProtocolKind, chain_id: u64) -> Self {
        Self {
            wallet: wallet.into(),
            protocol,
            chain_id,
            collateral_symbol: None,
        }
    }

    pub fn with_collateral_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.collateral_symbol = Some(symbol.into());
        self
    }
}

/// Normalized position plus its risk assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorResult {
    pub wallet: Address,
    pub protocol: ProtocolKind,
    pub chain: ChainId,
    pub position: NormalizedPosition,
    pub assessment: RiskAssessment,
    /// Collateral quote used for the liquidation price, if any
    pub collateral_price: Option<PriceQuote>,
}

/// Orchestrates adapters, price resolution and risk calculation.
pub struct PositionMonitor {
    provider: Arc<dyn ChainDataProvider>,
    resolver: PriceResolver,
    risk: RiskConfig,
    chain_deadline: Duration,
}

impl PositionMonitor {
    pub fn new(
        provider: Arc<dyn ChainDataProvider>,
        resolver: PriceResolver,
        risk: RiskConfig,
        chain_deadline: Duration,
    ) -> Self {
        Self {
            provider,
            resolver,
            risk,
            chain_deadline,
        }
    }

    /// Build the monitor with the JSON-RPC provider and CoinGecko resolver.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = Arc::new(JsonRpcProvider::new(&config.rpc)?);
        let resolver = PriceResolver::from_config(config)?;

        info!(chains = ChainId::ALL.len(), "Position monitor initialized");
        Ok(Self::new(
            provider,
            resolver,
            config.risk.clone(),
            config.timeouts.chain_deadline(),
        ))
    }

    /// Run the full pipeline for one protocol.
    #[instrument(skip(self), fields(wallet = %request.wallet, protocol = %request.protocol, chain_id = request.chain_id))]
    pub async fn monitor(&self, request: &MonitorRequest) -> Result<MonitorResult, MonitorError> {
        let chain = validate_chain(request.chain_id)?;
        let wallet = validate_wallet(&request.wallet)?;

        let adapter = connect_adapter(
            request.protocol,
            chain,
            self.provider.clone(),
            self.chain_deadline,
        )
        .await?;

        let position = adapter.fetch_and_normalize(&wallet).await?;

        let collateral_price = match &request.collateral_symbol {
            Some(symbol) if position.is_leveraged() => Some(
                self.resolver
                    .resolve(symbol, &PriceContext::on_chain(chain))
                    .await?,
            ),
            _ => None,
        };

        let assessment = self.assess(&position, collateral_price.as_ref().map(|q| q.usd));

        info!(
            health_factor = assessment.health_factor,
            severity = %assessment.severity,
            "Position assessed"
        );
        if assessment.triggers_alert {
            warn!(
                health_factor = assessment.health_factor,
                buffer_percent = assessment.buffer_percent,
                action = assessment.severity.action(),
                "Position below alert threshold"
            );
        }

        Ok(MonitorResult {
            wallet,
            protocol: request.protocol,
            chain,
            position,
            assessment,
            collateral_price,
        })
    }

    /// Run the pipeline for several protocols concurrently.
    ///
    /// Each protocol's outcome is reported independently; one failure
    /// does not affect the others.
    pub async fn monitor_protocols(
        &self,
        wallet: &str,
        protocols: &[ProtocolKind],
        chain_id: u64,
        collateral_symbol: Option<&str>,
    ) -> Result<Vec<(ProtocolKind, Result<MonitorResult, MonitorError>)>, MonitorError> {
        if protocols.is_empty() {
            return Err(MonitorError::InvalidInput(
                "At least one protocol is required".to_string(),
            ));
        }
        validate_chain(chain_id)?;
        validate_wallet(wallet)?;

        let runs = protocols.iter().map(|&protocol| async move {
            let mut request = MonitorRequest::new(wallet, protocol, chain_id);
            request.collateral_symbol = collateral_symbol.map(str::to_string);
            (protocol, self.monitor(&request).await)
        });

        Ok(join_all(runs).await)
    }

    /// Derive the risk assessment from a normalized position.
    ///
    /// `collateral_price_usd` converts collateral value into an amount of
    /// the collateral asset; without it the liquidation price is relative
    /// to the current collateral price. A price that is not finite (zero
    /// effective threshold) is reported as absent.
    pub fn assess(
        &self,
        position: &NormalizedPosition,
        collateral_price_usd: Option<f64>,
    ) -> RiskAssessment {
        let health_factor = position.health_factor;

        let liquidation_price = position
            .is_leveraged()
            .then(|| {
                let collateral_amount = match collateral_price_usd {
                    Some(price) => position.total_collateral_usd / price,
                    None => position.total_collateral_usd,
                };
                risk::liquidation_price(
                    collateral_amount,
                    position.total_debt_usd,
                    DEBT_PRICE_USD,
                    position.liquidation_threshold,
                    self.risk.liquidation_bonus,
                )
            })
            .filter(|price| price.is_finite());

        let (triggers_alert, severity) = risk::classify_severity(
            health_factor,
            self.risk.alert_threshold,
            self.risk.critical_threshold,
        );

        RiskAssessment {
            health_factor,
            liquidation_price,
            buffer_percent: risk::buffer_percent(health_factor),
            severity,
            triggers_alert,
        }
    }
}

fn validate_chain(chain_id: u64) -> Result<ChainId, MonitorError> {
    ChainId::from_id(chain_id).ok_or(MonitorError::UnsupportedChain(chain_id))
}

fn validate_wallet(wallet: &str) -> Result<Address, MonitorError> {
    if !wallet.starts_with("0x") {
        return Err(MonitorError::InvalidInput(format!(
            "wallet {:?}: missing 0x prefix",
            wallet
        )));
    }
    wallet
        .parse()
        .map_err(|e| MonitorError::InvalidInput(format!("wallet {:?}: {}", wallet, e)))
}
