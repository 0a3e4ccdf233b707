//! # chainflow-core
//!
//! Turns workflow graphs into tool chains and executes each tool against the
//! ledger network.
//!
//! ## Components
//!
//! - **workflow**: [`compile`] a node/edge graph into an ordered [`ToolChain`], and [`expand`] it back
//! - **registry**: [`ActionRegistry`] maps a [`ToolType`] to its [`ActionHandler`]
//! - **pipeline**: [`TransactionPipeline`] runs preflight, gas estimation, submission and confirmation
//! - **composite**: [`CompositeActionCoordinator`] sequences dependent transactions (deploy then mint, airdrop)
//! - **result**: [`ResultAssembler`] builds the `{ success, ... }` response envelope
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chainflow_core::{ActionContext, ActionParams, ActionRegistry, NetworkConfig, StaticPriceSource};
//! use chainflow_ledger::LedgerClient;
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), chainflow_core::ActionError> {
//! let ctx = ActionContext::new(
//!     LedgerClient::new_mock(),
//!     NetworkConfig::default(),
//!     Arc::new(StaticPriceSource::new()),
//! );
//! let registry = ActionRegistry::new();
//! let params = ActionParams::from_value(json!({
//!     "address": "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
//! }))?;
//! let response = registry.dispatch(&ctx, "get_balance", &params).await;
//! println!("{} {}", response.status, response.body);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod actions;
pub mod composite;
pub mod config;
mod context;
mod error;
mod params;
pub mod pipeline;
mod price;
mod registry;
mod result;
pub mod workflow;

pub use composite::{CollectionSource, CompositeActionCoordinator, StepRecord};
pub use config::NetworkConfig;
pub use context::ActionContext;
pub use error::{ActionError, ErrorKind};
pub use params::ActionParams;
pub use pipeline::{
    buffered_gas_limit, extract_event, CallSpec, GasPlan, Preflight, TransactionOutcome,
    TransactionPipeline,
};
pub use price::{HttpPriceSource, PriceQuote, PriceSource, StaticPriceSource};
pub use registry::{run, ActionHandler, ActionRegistry, ToolType};
pub use result::{ActionOutput, ActionResponse, ResultAssembler};
pub use workflow::{compile, expand, ToolChain, ToolChainEntry, WorkflowGraph};
