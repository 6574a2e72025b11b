//! Aave-style pool adapter (Aave V3, Spark, Radiant).

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::abi::IPool;
use super::types::{NormalizedPosition, RawAccountState};
use super::{read_call, require_market, ProtocolAdapter, ProtocolKind};
use crate::chain::{scale_down, Address, ChainDataProvider, ChainId, U256};
use crate::error::ProtocolError;

/// USD base currency uses 8 decimals.
const BASE_CURRENCY_SCALE: f64 = 1e8;
/// Thresholds and LTV are basis points.
const PERCENTAGE_SCALE: f64 = 1e4;
/// Health factor is a WAD.
const HEALTH_FACTOR_SCALE: f64 = 1e18;

/// Market configuration for a protocol exposing the Aave pool interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AaveMarketConfig {
    pub protocol: ProtocolKind,
}

impl AaveMarketConfig {
    pub const AAVE_V3: AaveMarketConfig = AaveMarketConfig {
        protocol: ProtocolKind::AaveV3,
    };

    pub const SPARK: AaveMarketConfig = AaveMarketConfig {
        protocol: ProtocolKind::Spark,
    };

    pub const RADIANT: AaveMarketConfig = AaveMarketConfig {
        protocol: ProtocolKind::Radiant,
    };
}

/// Raw `getUserAccountData` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AaveAccountData {
    pub total_collateral_base: U256,
    pub total_debt_base: U256,
    pub available_borrows_base: U256,
    pub current_liquidation_threshold: U256,
    pub ltv: U256,
    pub health_factor: U256,
}

impl From<IPool::getUserAccountDataReturn> for AaveAccountData {
    fn from(data: IPool::getUserAccountDataReturn) -> Self {
        Self {
            total_collateral_base: data.totalCollateralBase,
            total_debt_base: data.totalDebtBase,
            available_borrows_base: data.availableBorrowsBase,
            current_liquidation_threshold: data.currentLiquidationThreshold,
            ltv: data.ltv,
            health_factor: data.healthFactor,
        }
    }
}

impl AaveAccountData {
    /// Convert base units to USD and fractions.
    ///
    /// The pool reports `type(uint256).max` as health factor for accounts
    /// without debt; that, and any zero-debt account, maps to `+inf`.
    pub fn normalize(&self) -> Result<NormalizedPosition, ProtocolError> {
        let liquidation_threshold =
            scale_down(self.current_liquidation_threshold, PERCENTAGE_SCALE);
        let ltv = scale_down(self.ltv, PERCENTAGE_SCALE);

        if liquidation_threshold > 1.0 || ltv > 1.0 {
            return Err(ProtocolError::FetchFailed(format!(
                "threshold {} / ltv {} exceed 100%",
                liquidation_threshold, ltv
            )));
        }

        let health_factor = if self.health_factor == U256::MAX || self.total_debt_base.is_zero() {
            f64::INFINITY
        } else {
            scale_down(self.health_factor, HEALTH_FACTOR_SCALE)
        };

        Ok(NormalizedPosition {
            total_collateral_usd: scale_down(self.total_collateral_base, BASE_CURRENCY_SCALE),
            total_debt_usd: scale_down(self.total_debt_base, BASE_CURRENCY_SCALE),
            liquidation_threshold,
            ltv,
            health_factor,
            available_borrows_usd: scale_down(self.available_borrows_base, BASE_CURRENCY_SCALE),
            sub_positions: Vec::new(),
        })
    }
}

/// Adapter for any pool exposing the Aave V3 account data interface.
pub struct AaveStyleAdapter {
    market: AaveMarketConfig,
    chain: ChainId,
    pool: Address,
    provider: Arc<dyn ChainDataProvider>,
    deadline: Duration,
}

impl AaveStyleAdapter {
    /// Bind the adapter to the market's pool on `chain`.
    ///
    /// Fails with `UnsupportedConfiguration` when the protocol has no pool
    /// registered on that chain.
    pub fn new(
        market: AaveMarketConfig,
        chain: ChainId,
        provider: Arc<dyn ChainDataProvider>,
        deadline: Duration,
    ) -> Result<Self, ProtocolError> {
        let pool = require_market(market.protocol, chain)?;

        Ok(Self {
            market,
            chain,
            pool,
            provider,
            deadline,
        })
    }

    pub fn pool(&self) -> Address {
        self.pool
    }

    /// Read the raw six-value account summary.
    pub async fn fetch_raw(&self, wallet: &Address) -> Result<RawAccountState, ProtocolError> {
        let data = read_call(
            self.provider.as_ref(),
            self.chain,
            self.pool,
            IPool::getUserAccountDataCall { user: *wallet },
            self.deadline,
        )
        .await?;
        Ok(RawAccountState::Aave(data.into()))
    }
}

#[async_trait]
impl ProtocolAdapter for AaveStyleAdapter {
    fn protocol(&self) -> ProtocolKind {
        self.market.protocol
    }

    fn chain(&self) -> ChainId {
        self.chain
    }

    #[instrument(skip(self), fields(protocol = %self.market.protocol, chain = %self.chain))]
    async fn fetch_and_normalize(
        &self,
        wallet: &Address,
    ) -> Result<NormalizedPosition, ProtocolError> {
        let position = self.fetch_raw(wallet).await?.normalize()?;

        debug!(
            collateral_usd = position.total_collateral_usd,
            debt_usd = position.total_debt_usd,
            health_factor = position.health_factor,
            "Normalized Aave-style account data"
        );

        Ok(position)
    }
}
