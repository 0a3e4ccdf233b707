use async_trait::async_trait;
use chainflow_ledger::abi::Token;
use chainflow_ledger::abis;
use chainflow_primitives::{parse_ether, parse_units};

use super::{require_positive, token_decimals, token_text};
use crate::context::ActionContext;
use crate::error::ActionError;
use crate::params::ActionParams;
use crate::pipeline::{CallSpec, Preflight};
use crate::registry::ActionHandler;
use crate::result::ActionOutput;

/// Native transfer, or ERC-20 transfer when `tokenAddress` is given
pub struct Transfer;

#[async_trait]
impl ActionHandler for Transfer {
    fn required_fields(&self) -> &'static [&'static str] {
        &["privateKey", "toAddress", "amount"]
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let to = params.address("toAddress")?;
        let token = params.opt_address("tokenAddress")?;
        let amount = params.required_text("amount")?;
        let signer = params.signer()?;

        let Some(token) = token else {
            let value = parse_ether(&amount)?;
            require_positive(value, "amount")?;

            let result = ctx
                .pipeline()
                .execute(&signer, &CallSpec::native_transfer(to, value))
                .await?;

            return Ok(ActionOutput::new()
                .field("type", "native")
                .field("from", signer.address().to_checksum())
                .field("to", to.to_checksum())
                .field("amount", amount)
                .transaction(&result.outcome));
        };

        let decimals = token_decimals(ctx.client(), token).await.map_err(|_| {
            ActionError::InvalidInput(
                "Invalid token address or token does not support decimals()".to_string(),
            )
        })?;
        let value = parse_units(&amount, decimals)?;
        require_positive(value, "amount")?;

        let name = token_text(ctx.client(), token, "name", "Token").await;
        let symbol = token_text(ctx.client(), token, "symbol", "TOKEN").await;

        let data = abis::erc20().encode_call("transfer", &[Token::Address(to), Token::Uint(value)])?;
        let spec = CallSpec::contract_call("transfer", token, data).with_preflight(Preflight::Token {
            token,
            required: value,
            decimals,
            symbol: symbol.clone(),
        });
        let result = ctx.pipeline().execute(&signer, &spec).await?;

        Ok(ActionOutput::new()
            .field("type", "ERC20")
            .field("from", signer.address().to_checksum())
            .field("to", to.to_checksum())
            .field("tokenAddress", token.to_checksum())
            .field("tokenName", name)
            .field("tokenSymbol", symbol)
            .field("amount", amount)
            .transaction(&result.outcome))
    }
}
