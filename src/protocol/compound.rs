//! Compound V3 (Comet) adapter.
//!
//! Simplified single-collateral model: one borrow balance, one collateral
//! balance and one spot price. Liquidation threshold and LTV are fixed
//! protocol constants, not the per-asset factors configured on-chain.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::abi::IComet;
use super::types::{NormalizedPosition, RawAccountState};
use super::{read_call, require_market, ProtocolAdapter, ProtocolKind};
use crate::chain::{scale_down, Address, ChainDataProvider, ChainId, U256};
use crate::error::ProtocolError;
use crate::risk;

/// Base asset (USDC) decimals.
const BASE_ASSET_SCALE: f64 = 1e6;
/// Combined collateral-balance and price-feed decimals.
const COLLATERAL_VALUE_SCALE: f64 = 1e14;

pub const COMET_LIQUIDATION_THRESHOLD: f64 = 0.80;
pub const COMET_LTV: f64 = 0.75;

/// Raw Comet reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CometAccountData {
    pub borrow_balance: U256,
    pub collateral_balance: U256,
    pub price: U256,
}

impl CometAccountData {
    pub fn normalize(&self) -> Result<NormalizedPosition, ProtocolError> {
        let total_debt_usd = scale_down(self.borrow_balance, BASE_ASSET_SCALE);
        let total_collateral_usd = scale_down(self.collateral_balance, 1.0)
            * scale_down(self.price, 1.0)
            / COLLATERAL_VALUE_SCALE;

        let health_factor =
            risk::health_factor(total_collateral_usd, total_debt_usd, COMET_LIQUIDATION_THRESHOLD)
                .map_err(|e| ProtocolError::FetchFailed(e.to_string()))?;

        Ok(NormalizedPosition {
            total_collateral_usd,
            total_debt_usd,
            liquidation_threshold: COMET_LIQUIDATION_THRESHOLD,
            ltv: COMET_LTV,
            health_factor,
            available_borrows_usd: 0.0,
            sub_positions: Vec::new(),
        })
    }
}

/// Adapter for a Comet market.
pub struct CometAdapter {
    chain: ChainId,
    comet: Address,
    provider: Arc<dyn ChainDataProvider>,
    deadline: Duration,
}

impl CometAdapter {
    pub fn new(
        chain: ChainId,
        provider: Arc<dyn ChainDataProvider>,
        deadline: Duration,
    ) -> Result<Self, ProtocolError> {
        let comet = require_market(ProtocolKind::CompoundV3, chain)?;

        Ok(Self {
            chain,
            comet,
            provider,
            deadline,
        })
    }

    /// Issue the three reads concurrently; any failure fails the fetch.
    pub async fn fetch_raw(&self, wallet: &Address) -> Result<RawAccountState, ProtocolError> {
        let provider = self.provider.as_ref();
        let account = *wallet;

        let (borrow_balance, collateral_balance, price) = tokio::try_join!(
            read_call(
                provider,
                self.chain,
                self.comet,
                IComet::borrowBalanceOfCall { account },
                self.deadline
            ),
            read_call(
                provider,
                self.chain,
                self.comet,
                IComet::collateralBalanceOfCall { account },
                self.deadline
            ),
            read_call(provider, self.chain, self.comet, IComet::getPriceCall {}, self.deadline),
        )?;

        Ok(RawAccountState::Comet(CometAccountData {
            borrow_balance,
            collateral_balance,
            price,
        }))
    }
}

#[async_trait]
impl ProtocolAdapter for CometAdapter {
    fn protocol(&self) -> ProtocolKind {
        ProtocolKind::CompoundV3
    }

    fn chain(&self) -> ChainId {
        self.chain
    }

    #[instrument(skip(self), fields(chain = %self.chain))]
    async fn fetch_and_normalize(
        &self,
        wallet: &Address,
    ) -> Result<NormalizedPosition, ProtocolError> {
        let position = self.fetch_raw(wallet).await?.normalize()?;

        debug!(
            collateral_usd = position.total_collateral_usd,
            debt_usd = position.total_debt_usd,
            health_factor = position.health_factor,
            "Normalized Comet account data"
        );

        Ok(position)
    }
}
