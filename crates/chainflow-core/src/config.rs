//! Network configuration

use std::time::Duration;

use chainflow_primitives::{Address, H256};
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// TokenFactory deployed on the Somnia testnet
pub const DEFAULT_TOKEN_FACTORY: Address = Address::from_bytes([
    0x19, 0xfa, 0xe1, 0x3f, 0x4c, 0x2f, 0xac, 0x05, 0x39, 0xb5, 0xe0, 0xba, 0xc8, 0xad, 0x17, 0x85,
    0xf1, 0xc7, 0xde, 0xe1,
]);

/// Swap router deployed on the Somnia testnet
pub const DEFAULT_SWAP_ROUTER: Address = Address::from_bytes([
    0x6a, 0xac, 0x14, 0xf0, 0x90, 0xa3, 0x5e, 0xea, 0x15, 0x07, 0x05, 0xf7, 0x2d, 0x90, 0xe4, 0xcd,
    0xc4, 0xa4, 0x9b, 0x2c,
]);

/// $PING test token
pub const DEFAULT_PING_TOKEN: Address = Address::from_bytes([
    0xbe, 0xcd, 0x9b, 0x5f, 0x37, 0x38, 0x77, 0x88, 0x1d, 0x91, 0xcb, 0xdb, 0xaf, 0x01, 0x3d, 0x97,
    0xeb, 0x53, 0x21, 0x54,
]);

/// $PONG test token
pub const DEFAULT_PONG_TOKEN: Address = Address::from_bytes([
    0x79, 0x68, 0xac, 0x15, 0xa7, 0x26, 0x29, 0xe0, 0x5f, 0x41, 0xb8, 0x27, 0x1e, 0x4e, 0x72, 0x92,
    0xe0, 0xcc, 0x9f, 0x90,
]);

/// Read-only, process-wide network settings shared by every action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Chain ID; asked from the node when unset
    #[serde(default)]
    pub chain_id: Option<u64>,
    /// Human-readable network name
    #[serde(default = "default_network_name")]
    pub network_name: String,
    /// Native currency symbol
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    /// Block explorer base URL
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
    /// ERC-20 factory
    #[serde(default = "default_token_factory")]
    pub token_factory: Address,
    /// Swap router
    #[serde(default = "default_swap_router")]
    pub swap_router: Address,
    /// Input token of the fixed ping-pong swap
    #[serde(default = "default_ping_token")]
    pub ping_token: Address,
    /// Output token of the fixed ping-pong swap
    #[serde(default = "default_pong_token")]
    pub pong_token: Address,
    /// ERC-721 collection factory
    #[serde(default)]
    pub nft_factory: Option<Address>,
    /// DAO factory
    #[serde(default)]
    pub dao_factory: Option<Address>,
    /// Batch airdrop contract
    #[serde(default)]
    pub airdrop: Option<Address>,
    /// Pool fee tier used for swaps (hundredths of a bip)
    #[serde(default = "default_swap_fee_tier")]
    pub swap_fee_tier: u32,
    /// Slippage tolerance in percent when the request does not give one
    #[serde(default = "default_slippage")]
    pub default_slippage: u8,
    /// Gas limit used when estimation fails
    #[serde(default = "default_fallback_gas_limit")]
    pub fallback_gas_limit: u64,
    /// Receipt polling interval
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
    /// Per-request RPC timeout
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
    /// Fee charged by the airdrop contract per recipient, in wei
    #[serde(default)]
    pub airdrop_fee_per_recipient: u64,
    /// Base URL of a CoinGecko-compatible price API
    #[serde(default = "default_price_api_url")]
    pub price_api_url: String,
}

fn default_rpc_url() -> String {
    "https://dream-rpc.somnia.network".to_string()
}

fn default_network_name() -> String {
    "Somnia Testnet".to_string()
}

fn default_native_symbol() -> String {
    "STT".to_string()
}

fn default_explorer_url() -> String {
    "https://shannon-explorer.somnia.network".to_string()
}

fn default_token_factory() -> Address {
    DEFAULT_TOKEN_FACTORY
}

fn default_swap_router() -> Address {
    DEFAULT_SWAP_ROUTER
}

fn default_ping_token() -> Address {
    DEFAULT_PING_TOKEN
}

fn default_pong_token() -> Address {
    DEFAULT_PONG_TOKEN
}

fn default_swap_fee_tier() -> u32 {
    500
}

fn default_slippage() -> u8 {
    3
}

fn default_fallback_gas_limit() -> u64 {
    500_000
}

fn default_receipt_poll_interval_ms() -> u64 {
    1000
}

fn default_rpc_timeout_secs() -> u64 {
    30
}

fn default_price_api_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: None,
            network_name: default_network_name(),
            native_symbol: default_native_symbol(),
            explorer_url: default_explorer_url(),
            token_factory: default_token_factory(),
            swap_router: default_swap_router(),
            ping_token: default_ping_token(),
            pong_token: default_pong_token(),
            nft_factory: None,
            dao_factory: None,
            airdrop: None,
            swap_fee_tier: default_swap_fee_tier(),
            default_slippage: default_slippage(),
            fallback_gas_limit: default_fallback_gas_limit(),
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
            rpc_timeout_secs: default_rpc_timeout_secs(),
            airdrop_fee_per_recipient: 0,
            price_api_url: default_price_api_url(),
        }
    }
}

impl NetworkConfig {
    /// Explorer link for a transaction
    pub fn explorer_tx_url(&self, hash: &H256) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), hash.to_hex())
    }

    /// Receipt polling interval
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    /// RPC request timeout
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    /// NFT factory, or `NotConfigured`
    pub fn nft_factory(&self) -> Result<Address, ActionError> {
        self.nft_factory.ok_or(ActionError::NotConfigured("nft_factory"))
    }

    /// DAO factory, or `NotConfigured`
    pub fn dao_factory(&self) -> Result<Address, ActionError> {
        self.dao_factory.ok_or(ActionError::NotConfigured("dao_factory"))
    }

    /// Airdrop contract, or `NotConfigured`
    pub fn airdrop_contract(&self) -> Result<Address, ActionError> {
        self.airdrop.ok_or(ActionError::NotConfigured("airdrop"))
    }
}
