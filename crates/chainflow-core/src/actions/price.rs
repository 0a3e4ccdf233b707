use async_trait::async_trait;

use crate::context::ActionContext;
use crate::error::ActionError;
use crate::params::ActionParams;
use crate::registry::ActionHandler;
use crate::result::ActionOutput;

/// Spot price through the configured price source
pub struct FetchPrice;

#[async_trait]
impl ActionHandler for FetchPrice {
    fn required_fields(&self) -> &'static [&'static str] {
        &["token"]
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let token = params.required_text("token")?;
        let currency = params.text("currency").unwrap_or_else(|| "usd".to_string());

        let quote = ctx.prices().price(&token, &currency).await?;
        Ok(ActionOutput::new()
            .field("token", quote.token)
            .field("currency", quote.currency)
            .field("price", quote.price))
    }
}
