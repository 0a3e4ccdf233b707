use async_trait::async_trait;
use chainflow_ledger::BlockId;
use chainflow_primitives::{format_ether, format_units, Address};
use serde_json::{json, Value};

use super::{token_balance, token_decimals, token_text};
use crate::composite::parse_recipients;
use crate::context::ActionContext;
use crate::error::ActionError;
use crate::params::ActionParams;
use crate::registry::ActionHandler;
use crate::result::ActionOutput;

/// Native balance, or ERC-20 balance when `token` is given
pub struct GetBalance;

/// Native balance, transaction count and optional token balances
pub struct WalletAnalytics;

#[async_trait]
impl ActionHandler for GetBalance {
    fn required_fields(&self) -> &'static [&'static str] {
        &["address"]
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let address = params.address("address")?;
        let token = params.opt_address("token")?;

        let Some(token) = token else {
            let balance = ctx.client().get_balance(&address, BlockId::Latest).await?;
            return Ok(ActionOutput::new()
                .field("address", address.to_checksum())
                .field("balance", format_ether(balance))
                .field("balanceWei", balance.to_string()));
        };

        let summary = token_summary(ctx, token, address).await?;
        let mut output = ActionOutput::new().field("address", address.to_checksum());
        if let Value::Object(fields) = summary {
            for (key, value) in fields {
                output = output.field(&key, value);
            }
        }
        Ok(output)
    }
}

async fn token_summary(
    ctx: &ActionContext,
    token: Address,
    owner: Address,
) -> Result<Value, ActionError> {
    let decimals = token_decimals(ctx.client(), token).await?;
    let balance = token_balance(ctx.client(), token, owner).await?;
    let name = token_text(ctx.client(), token, "name", "Token").await;
    let symbol = token_text(ctx.client(), token, "symbol", "TOKEN").await;

    Ok(json!({
        "token": token.to_checksum(),
        "name": name,
        "symbol": symbol,
        "balance": format_units(balance, decimals),
        "balanceWei": balance.to_string(),
        "decimals": decimals,
    }))
}

#[async_trait]
impl ActionHandler for WalletAnalytics {
    fn required_fields(&self) -> &'static [&'static str] {
        &["address"]
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let address = params.address("address")?;
        let tokens = if params.is_present("tokens") {
            parse_recipients(&params.string_list("tokens")?)?
        } else {
            Vec::new()
        };

        let client = ctx.client();
        let block = client.block_number().await?;
        let balance = client.get_balance(&address, BlockId::Number(block)).await?;
        let transaction_count = client.get_nonce(&address, BlockId::Number(block)).await?;

        let mut token_balances = Vec::with_capacity(tokens.len());
        for token in tokens {
            token_balances.push(token_summary(ctx, token, address).await?);
        }

        Ok(ActionOutput::new()
            .field("address", address.to_checksum())
            .field("balance", format_ether(balance))
            .field("balanceWei", balance.to_string())
            .field("symbol", ctx.config().native_symbol.clone())
            .field("transactionCount", transaction_count)
            .field("tokenBalances", token_balances)
            .field("asOfBlock", block))
    }
}
