use async_trait::async_trait;
use chainflow_crypto::Signer;
use chainflow_ledger::abi::Token;
use chainflow_ledger::abis;
use chainflow_primitives::{parse_units, Address, U256};

use super::{require_positive, token_decimals, token_text};
use crate::context::ActionContext;
use crate::error::ActionError;
use crate::params::ActionParams;
use crate::pipeline::{AllowanceCheck, CallSpec, Preflight};
use crate::registry::ActionHandler;
use crate::result::ActionOutput;

/// Exact-input swap of `tokenIn` for `tokenOut`
pub struct Swap;

/// Swap along the configured PING -> PONG pair
pub struct SwapPingPong;

#[async_trait]
impl ActionHandler for Swap {
    fn required_fields(&self) -> &'static [&'static str] {
        &["privateKey", "tokenIn", "tokenOut", "amountIn"]
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let token_in = params.address("tokenIn")?;
        let token_out = params.address("tokenOut")?;
        let amount = params.required_text("amountIn")?;
        let slippage = slippage(ctx, params)?;
        let signer = params.signer()?;

        swap_exact_input(ctx, &signer, token_in, token_out, &amount, slippage).await
    }
}

#[async_trait]
impl ActionHandler for SwapPingPong {
    fn required_fields(&self) -> &'static [&'static str] {
        &["privateKey", "amount"]
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let amount = params.required_text("amount")?;
        let slippage = slippage(ctx, params)?;
        let signer = params.signer()?;

        let config = ctx.config();
        let output = swap_exact_input(
            ctx,
            &signer,
            config.ping_token,
            config.pong_token,
            &amount,
            slippage,
        )
        .await?;
        Ok(output.field("swap", "$PING -> $PONG").field("amount", amount))
    }
}

fn slippage(ctx: &ActionContext, params: &ActionParams) -> Result<u8, ActionError> {
    let slippage = params
        .opt_u64("slippageTolerance")?
        .unwrap_or(ctx.config().default_slippage as u64);
    if slippage > 100 {
        return Err(ActionError::InvalidInput(
            "slippageTolerance must be between 0 and 100".to_string(),
        ));
    }
    Ok(slippage as u8)
}

/// Minimum output accepted for `amount_in` at `slippage` percent
pub(crate) fn minimum_output(amount_in: U256, slippage: u8) -> U256 {
    amount_in * U256::from(100 - slippage as u64) / U256::from(100u64)
}

async fn swap_exact_input(
    ctx: &ActionContext,
    signer: &Signer,
    token_in: Address,
    token_out: Address,
    amount: &str,
    slippage: u8,
) -> Result<ActionOutput, ActionError> {
    let config = ctx.config();
    let decimals = token_decimals(ctx.client(), token_in).await?;
    let amount_in = parse_units(amount, decimals)?;
    require_positive(amount_in, "amountIn")?;
    let amount_out_minimum = minimum_output(amount_in, slippage);
    let symbol = token_text(ctx.client(), token_in, "symbol", "TOKEN").await;

    let data = abis::swap_router().encode_call(
        "exactInputSingle",
        &[Token::Tuple(vec![
            Token::Address(token_in),
            Token::Address(token_out),
            Token::Uint(U256::from(config.swap_fee_tier)),
            Token::Address(signer.address()),
            Token::Uint(amount_in),
            Token::Uint(amount_out_minimum),
            Token::Uint(U256::zero()),
        ])],
    )?;
    let spec = CallSpec::contract_call("swap", config.swap_router, data)
        .with_preflight(Preflight::Token {
            token: token_in,
            required: amount_in,
            decimals,
            symbol,
        })
        .with_allowance(AllowanceCheck {
            token: token_in,
            spender: config.swap_router,
            amount: amount_in,
        });

    let result = ctx.pipeline().execute(signer, &spec).await?;

    Ok(ActionOutput::new()
        .field("wallet", signer.address().to_checksum())
        .field("tokenIn", token_in.to_checksum())
        .field("tokenOut", token_out.to_checksum())
        .field("amountIn", amount)
        .field("amountOutMinimum", amount_out_minimum.to_string())
        .field("slippageTolerance", slippage)
        .field(
            "approveTxHash",
            result.approval.as_ref().map(|a| a.tx_hash.to_hex()),
        )
        .field("swapTxHash", result.outcome.tx_hash.to_hex())
        .transaction(&result.outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_output() {
        assert_eq!(minimum_output(U256::from(1000u64), 3), U256::from(970u64));
        assert_eq!(minimum_output(U256::from(1000u64), 0), U256::from(1000u64));
        assert_eq!(minimum_output(U256::from(1000u64), 100), U256::zero());
        // rounds down
        assert_eq!(minimum_output(U256::from(999u64), 3), U256::from(969u64));
    }
}
