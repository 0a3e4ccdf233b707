use async_trait::async_trait;
use chainflow_ledger::abi::Token;
use chainflow_ledger::abis;
use chainflow_primitives::parse_units;

use super::{require_positive, token_decimals, token_text};
use crate::context::ActionContext;
use crate::error::ActionError;
use crate::params::ActionParams;
use crate::pipeline::{AllowanceCheck, CallSpec, Preflight};
use crate::registry::ActionHandler;
use crate::result::ActionOutput;

/// Deposit the vault's underlying asset into an ERC-4626 vault
pub struct DepositYield;

#[async_trait]
impl ActionHandler for DepositYield {
    fn required_fields(&self) -> &'static [&'static str] {
        &["privateKey", "vaultAddress", "amount"]
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let vault = params.address("vaultAddress")?;
        let amount = params.required_text("amount")?;
        let signer = params.signer()?;

        let output = ctx
            .client()
            .read(vault, abis::yield_vault(), "asset", &[])
            .await?;
        let asset = output
            .first()
            .and_then(Token::as_address)
            .ok_or_else(|| ActionError::InvalidInput(format!("{} is not an ERC-4626 vault", vault)))?;

        let decimals = token_decimals(ctx.client(), asset).await?;
        let assets = parse_units(&amount, decimals)?;
        require_positive(assets, "amount")?;
        let symbol = token_text(ctx.client(), asset, "symbol", "TOKEN").await;

        let data = abis::yield_vault().encode_call(
            "deposit",
            &[Token::Uint(assets), Token::Address(signer.address())],
        )?;
        let spec = CallSpec::contract_call("deposit", vault, data)
            .with_preflight(Preflight::Token {
                token: asset,
                required: assets,
                decimals,
                symbol: symbol.clone(),
            })
            .with_allowance(AllowanceCheck {
                token: asset,
                spender: vault,
                amount: assets,
            });
        let result = ctx.pipeline().execute(&signer, &spec).await?;

        let shares = abis::yield_vault()
            .find_event(&result.outcome.logs, "Deposit")
            .and_then(|event| event.uint_arg("shares"))
            .map(|shares| shares.to_string());

        Ok(ActionOutput::new()
            .field("vaultAddress", vault.to_checksum())
            .field("asset", asset.to_checksum())
            .field("assetSymbol", symbol)
            .field("amount", amount)
            .field("shares", shares)
            .field(
                "approveTxHash",
                result.approval.as_ref().map(|a| a.tx_hash.to_hex()),
            )
            .transaction(&result.outcome))
    }
}
