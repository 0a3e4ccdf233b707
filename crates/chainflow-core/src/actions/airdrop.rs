use async_trait::async_trait;
use chainflow_primitives::format_ether;

use crate::composite::parse_recipients;
use crate::context::ActionContext;
use crate::error::ActionError;
use crate::params::ActionParams;
use crate::registry::ActionHandler;
use crate::result::ActionOutput;

/// Send the same native amount to every recipient in one transaction
pub struct Airdrop;

#[async_trait]
impl ActionHandler for Airdrop {
    fn required_fields(&self) -> &'static [&'static str] {
        &["privateKey", "recipients", "amount"]
    }

    fn validate(&self, params: &ActionParams) -> Result<(), ActionError> {
        params.require(self.required_fields())?;
        parse_recipients(&params.string_list("recipients")?).map(|_| ())
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let recipients = params.string_list("recipients")?;
        let amount = params.required_text("amount")?;
        let signer = params.signer()?;

        let outcome = ctx
            .coordinator()
            .airdrop(&signer, &recipients, &amount)
            .await?;

        let recipients: Vec<String> = outcome.recipients.iter().map(|a| a.to_checksum()).collect();
        Ok(ActionOutput::new()
            .field("sender", signer.address().to_checksum())
            .field("recipientCount", recipients.len())
            .field("recipients", recipients)
            .field("amountPerRecipient", amount)
            .field("totalValue", format_ether(outcome.total_value))
            .field("totalValueWei", outcome.total_value.to_string())
            .transaction(&outcome.outcome))
    }
}
