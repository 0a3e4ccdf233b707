//! Tool types and their handlers

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::actions;
use crate::context::ActionContext;
use crate::error::ActionError;
use crate::params::ActionParams;
use crate::result::{ActionOutput, ActionResponse};

/// Supported tool types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    /// Native or ERC-20 transfer
    Transfer,
    /// Single-pool token swap
    Swap,
    /// Native or ERC-20 balance
    GetBalance,
    /// Deploy an ERC-20 through the token factory
    #[serde(rename = "deploy_erc20")]
    DeployErc20,
    /// Deploy an ERC-721 collection through the NFT factory
    #[serde(rename = "deploy_erc721")]
    DeployErc721,
    /// Deploy a DAO through the DAO factory
    CreateDao,
    /// Batch native airdrop
    Airdrop,
    /// Spot price lookup
    FetchPrice,
    /// Deposit into an ERC-4626 vault
    DepositYield,
    /// Balance and activity summary of an address
    WalletAnalytics,
}

impl ToolType {
    /// Every tool type
    pub const ALL: [ToolType; 10] = [
        ToolType::Transfer,
        ToolType::Swap,
        ToolType::GetBalance,
        ToolType::DeployErc20,
        ToolType::DeployErc721,
        ToolType::CreateDao,
        ToolType::Airdrop,
        ToolType::FetchPrice,
        ToolType::DepositYield,
        ToolType::WalletAnalytics,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::Transfer => "transfer",
            ToolType::Swap => "swap",
            ToolType::GetBalance => "get_balance",
            ToolType::DeployErc20 => "deploy_erc20",
            ToolType::DeployErc721 => "deploy_erc721",
            ToolType::CreateDao => "create_dao",
            ToolType::Airdrop => "airdrop",
            ToolType::FetchPrice => "fetch_price",
            ToolType::DepositYield => "deposit_yield",
            ToolType::WalletAnalytics => "wallet_analytics",
        }
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolType {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolType::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| ActionError::UnknownTool(s.to_string()))
    }
}

/// Executes one kind of action
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Fields that must be present and non-empty
    fn required_fields(&self) -> &'static [&'static str];

    /// Check the request before anything touches the network
    fn validate(&self, params: &ActionParams) -> Result<(), ActionError> {
        params.require(self.required_fields())
    }

    /// Run the action
    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError>;
}

/// Validate, execute and wrap the result of `handler`
pub async fn run(
    handler: &dyn ActionHandler,
    ctx: &ActionContext,
    params: &ActionParams,
) -> ActionResponse {
    let result = match handler.validate(params) {
        Ok(()) => handler.execute(ctx, params).await,
        Err(e) => Err(e),
    };
    ctx.assembler().assemble(result)
}

/// Tool type to handler table
pub struct ActionRegistry {
    handlers: HashMap<ToolType, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// Registry with a handler for every tool type
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
        };

        registry.register(ToolType::Transfer, actions::Transfer);
        registry.register(ToolType::Swap, actions::Swap);
        registry.register(ToolType::GetBalance, actions::GetBalance);
        registry.register(ToolType::DeployErc20, actions::DeployErc20);
        registry.register(ToolType::DeployErc721, actions::DeployErc721);
        registry.register(ToolType::CreateDao, actions::CreateDao);
        registry.register(ToolType::Airdrop, actions::Airdrop);
        registry.register(ToolType::FetchPrice, actions::FetchPrice);
        registry.register(ToolType::DepositYield, actions::DepositYield);
        registry.register(ToolType::WalletAnalytics, actions::WalletAnalytics);

        registry
    }

    /// Register or replace a handler
    pub fn register(&mut self, tool: ToolType, handler: impl ActionHandler + 'static) {
        self.handlers.insert(tool, Arc::new(handler));
    }

    /// Handler for a tool name
    pub fn resolve(&self, tool: &str) -> Result<Arc<dyn ActionHandler>, ActionError> {
        let tool: ToolType = tool.parse()?;
        self.handlers
            .get(&tool)
            .cloned()
            .ok_or_else(|| ActionError::UnknownTool(tool.to_string()))
    }

    /// Whether a handler is registered
    pub fn has_tool(&self, tool: ToolType) -> bool {
        self.handlers.contains_key(&tool)
    }

    /// Registered tools, sorted
    pub fn tools(&self) -> Vec<ToolType> {
        let mut tools: Vec<_> = self.handlers.keys().copied().collect();
        tools.sort();
        tools
    }

    /// Resolve and run a tool
    pub async fn dispatch(
        &self,
        ctx: &ActionContext,
        tool: &str,
        params: &ActionParams,
    ) -> ActionResponse {
        match self.resolve(tool) {
            Ok(handler) => {
                info!(tool, "dispatching action");
                run(handler.as_ref(), ctx, params).await
            }
            Err(e) => ctx.assembler().assemble(Err(e)),
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
