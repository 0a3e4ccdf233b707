//! Shared, read-only collaborators handed to every action

use std::sync::Arc;

use chainflow_ledger::LedgerClient;

use crate::composite::CompositeActionCoordinator;
use crate::config::NetworkConfig;
use crate::error::ActionError;
use crate::pipeline::TransactionPipeline;
use crate::price::{HttpPriceSource, PriceSource};
use crate::result::ResultAssembler;

/// Ledger client, configuration and price source for one process
#[derive(Clone)]
pub struct ActionContext {
    client: Arc<LedgerClient>,
    config: Arc<NetworkConfig>,
    prices: Arc<dyn PriceSource>,
}

impl ActionContext {
    /// Assemble a context from explicit collaborators
    pub fn new(client: LedgerClient, config: NetworkConfig, prices: Arc<dyn PriceSource>) -> Self {
        let client = match config.chain_id {
            Some(chain_id) => client.with_chain_id(chain_id),
            None => client,
        };
        Self {
            client: Arc::new(client),
            config: Arc::new(config),
            prices,
        }
    }

    /// HTTP ledger client and price source built from `config`
    pub fn from_config(config: NetworkConfig) -> Result<Self, ActionError> {
        let client = LedgerClient::http(&config.rpc_url, config.rpc_timeout())?;
        let prices = HttpPriceSource::new(&config.price_api_url, config.rpc_timeout())?;
        Ok(Self::new(client, config, Arc::new(prices)))
    }

    /// Ledger client
    pub fn client(&self) -> &LedgerClient {
        &self.client
    }

    /// Network configuration
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Price source
    pub fn prices(&self) -> &dyn PriceSource {
        self.prices.as_ref()
    }

    /// Single-transaction pipeline
    pub fn pipeline(&self) -> TransactionPipeline {
        TransactionPipeline::new(self.client.clone(), self.config.clone())
    }

    /// Multi-transaction coordinator
    pub fn coordinator(&self) -> CompositeActionCoordinator {
        CompositeActionCoordinator::new(self.client.clone(), self.config.clone())
    }

    /// Response envelope builder
    pub fn assembler(&self) -> ResultAssembler {
        ResultAssembler::new(self.config.clone())
    }
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("client", &self.client)
            .field("network", &self.config.network_name)
            .finish_non_exhaustive()
    }
}
