//! Handlers for every tool and HTTP action

mod airdrop;
mod balance;
mod deploy;
mod nft;
mod price;
mod swap;
mod transfer;
mod yield_vault;

pub use airdrop::Airdrop;
pub use balance::{GetBalance, WalletAnalytics};
pub use deploy::{CreateDao, DeployErc20, DeployErc721};
pub use nft::{metadata_uri, CreateAndMintNft, CreateNftCollection};
pub use price::FetchPrice;
pub use swap::{Swap, SwapPingPong};
pub use transfer::Transfer;
pub use yield_vault::DepositYield;

use chainflow_ledger::abi::Token;
use chainflow_ledger::{abis, LedgerClient};
use chainflow_primitives::{Address, U256};
use tracing::warn;

use crate::error::ActionError;

// ==================== ERC-20 Reads ====================

pub(crate) async fn token_decimals(client: &LedgerClient, token: Address) -> Result<u8, ActionError> {
    let output = client.read(token, abis::erc20(), "decimals", &[]).await?;
    output
        .first()
        .and_then(Token::as_uint)
        .filter(|d| *d <= U256::from(u8::MAX))
        .map(|d| d.low_u32() as u8)
        .ok_or_else(|| ActionError::InvalidInput(format!("{} returned no decimals", token)))
}

pub(crate) async fn token_balance(
    client: &LedgerClient,
    token: Address,
    owner: Address,
) -> Result<U256, ActionError> {
    let output = client
        .read(token, abis::erc20(), "balanceOf", &[Token::Address(owner)])
        .await?;
    output
        .first()
        .and_then(Token::as_uint)
        .ok_or_else(|| ActionError::Network {
            reason: "balanceOf returned no value".to_string(),
            code: None,
        })
}

/// `name()` or `symbol()`, falling back to `fallback` when the read fails
pub(crate) async fn token_text(
    client: &LedgerClient,
    token: Address,
    function: &str,
    fallback: &str,
) -> String {
    match client.read(token, abis::erc20(), function, &[]).await {
        Ok(output) => output
            .first()
            .and_then(Token::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string()),
        Err(e) => {
            warn!(%token, function, error = %e, "token metadata read failed");
            fallback.to_string()
        }
    }
}

pub(crate) fn require_positive(value: U256, field: &str) -> Result<(), ActionError> {
    if value.is_zero() {
        return Err(ActionError::InvalidInput(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(())
}
