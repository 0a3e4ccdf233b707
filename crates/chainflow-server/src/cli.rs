//! CLI argument parsing for the chainflow binary

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use chainflow_server::AppConfig;

/// Chainflow action server
#[derive(Parser, Debug, Clone)]
#[command(name = "chainflow")]
#[command(about = "HTTP server executing blockchain actions and workflows")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.chainflow/config.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// HTTP listen address, overrides the config file
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// Ledger RPC endpoint, overrides the config file
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Chain ID, overrides the config file and skips the eth_chainId lookup
    #[arg(long)]
    pub chain_id: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply flag overrides on top of a loaded config
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(listen) = self.listen {
            config.server.listen_addr = listen;
        }
        if let Some(rpc_url) = &self.rpc_url {
            config.network.rpc_url = rpc_url.clone();
        }
        if let Some(chain_id) = self.chain_id {
            config.network.chain_id = Some(chain_id);
        }
    }
}
