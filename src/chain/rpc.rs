//! JSON-RPC chain data provider.
//!
//! Thin wrapper over one `alloy` HTTP provider per chain:
//! - `eth_chainId` as the connectivity check
//! - `eth_call` against the latest block for contract reads

use alloy::network::TransactionBuilder;
use alloy::primitives::Bytes;
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::provider::{ChainDataProvider, ContractCall};
use super::types::ChainId;
use crate::config::RpcConfig;

/// Chain data provider talking JSON-RPC over HTTP to one endpoint per chain.
#[derive(Clone)]
pub struct JsonRpcProvider {
    providers: HashMap<ChainId, RootProvider>,
}

impl JsonRpcProvider {
    /// Create a provider from the configured endpoint table.
    pub fn new(config: &RpcConfig) -> Result<Self> {
        let endpoints = ChainId::ALL
            .into_iter()
            .map(|chain| (chain, config.endpoint(chain).to_string()))
            .collect();
        Self::with_endpoints(endpoints)
    }

    /// Create a provider with an explicit chain -> endpoint map.
    pub fn with_endpoints(endpoints: HashMap<ChainId, String>) -> Result<Self> {
        let mut providers = HashMap::with_capacity(endpoints.len());
        for (chain, endpoint) in endpoints {
            let url = endpoint
                .parse()
                .with_context(|| format!("Invalid RPC endpoint for {}: {}", chain, endpoint))?;
            providers.insert(chain, RootProvider::new_http(url));
        }

        Ok(Self { providers })
    }

    fn provider(&self, chain: ChainId) -> Result<&RootProvider> {
        self.providers
            .get(&chain)
            .with_context(|| format!("No RPC endpoint configured for {}", chain))
    }
}

#[async_trait]
impl ChainDataProvider for JsonRpcProvider {
    #[instrument(skip(self), name = "rpc_check_connection")]
    async fn check_connection(&self, chain: ChainId) -> Result<()> {
        let reported_id = self
            .provider(chain)?
            .get_chain_id()
            .await
            .with_context(|| format!("eth_chainId failed on {}", chain))?;

        if reported_id != chain.id() {
            anyhow::bail!(
                "Endpoint for {} reports chain id {}",
                chain,
                reported_id
            );
        }

        debug!(chain = %chain, "RPC endpoint reachable");
        Ok(())
    }

    #[instrument(skip(self, call), fields(contract = %call.to, function = call.function))]
    async fn call(&self, chain: ChainId, call: &ContractCall) -> Result<Bytes> {
        let mut tx = TransactionRequest::default();
        tx.set_to(call.to);
        tx.set_input(call.input.clone());

        let output = self
            .provider(chain)?
            .call(tx)
            .await
            .with_context(|| format!("eth_call {} on {} failed", call.function, chain))?;

        debug!(bytes = output.len(), "eth_call returned");
        Ok(output)
    }
}
