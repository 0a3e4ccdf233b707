use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use crate::composite::{CollectionSource, MintOutcome};
use crate::context::ActionContext;
use crate::error::ActionError;
use crate::params::ActionParams;
use crate::registry::ActionHandler;
use crate::result::ActionOutput;

/// Deploy a collection and mint its first token to the signer
pub struct CreateNftCollection;

/// Mint into an existing collection, or deploy one first
pub struct CreateAndMintNft;

/// `data:` URI holding ERC-721 metadata JSON
pub fn metadata_uri(name: &str, description: &str, image: &str, attributes: &Value) -> String {
    let attributes = match attributes {
        Value::Array(_) => attributes.clone(),
        _ => Value::Array(Vec::new()),
    };
    let metadata = json!({
        "name": name,
        "description": description,
        "image": image,
        "attributes": attributes,
    });
    format!(
        "data:application/json;base64,{}",
        STANDARD.encode(metadata.to_string())
    )
}

/// Caller-supplied `metadataUri`, or one derived from the NFT fields
fn token_uri(params: &ActionParams, default_name: &str) -> String {
    if let Some(uri) = params.text("metadataUri") {
        return uri;
    }
    let name = params
        .text("nftName")
        .unwrap_or_else(|| default_name.to_string());
    metadata_uri(
        &name,
        &params.text("nftDescription").unwrap_or_default(),
        &params.text("imageUrl").unwrap_or_default(),
        params.value("attributes").unwrap_or(&Value::Null),
    )
}

fn mint_output(outcome: MintOutcome, metadata_uri: String) -> ActionOutput {
    let steps = serde_json::to_value(&outcome.steps).unwrap_or(Value::Null);
    ActionOutput::new()
        .field("collectionAddress", outcome.collection.to_checksum())
        .field("collectionCreated", outcome.created)
        .field("tokenId", outcome.token_id.map(|id| id.to_string()))
        .field("metadataUri", metadata_uri)
        .field("steps", steps)
        .field("mintTxHash", outcome.mint.tx_hash.to_hex())
        .transaction(&outcome.mint)
}

#[async_trait]
impl ActionHandler for CreateNftCollection {
    fn required_fields(&self) -> &'static [&'static str] {
        &["privateKey", "name", "symbol"]
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let name = params.required_text("name")?;
        let symbol = params.required_text("symbol")?;
        let base_uri = params.text("baseURI").unwrap_or_default();
        let recipient = params.opt_address("recipientAddress")?;
        ctx.config().nft_factory()?;
        let signer = params.signer()?;
        let recipient = recipient.unwrap_or_else(|| signer.address());

        let uri = token_uri(params, &name);
        let outcome = ctx
            .coordinator()
            .create_collection_and_mint(
                &signer,
                CollectionSource::New {
                    name: name.clone(),
                    symbol: symbol.clone(),
                    base_uri,
                },
                recipient,
                &uri,
            )
            .await?;

        Ok(mint_output(outcome, uri)
            .field("name", name)
            .field("symbol", symbol)
            .field("recipient", recipient.to_checksum()))
    }
}

#[async_trait]
impl ActionHandler for CreateAndMintNft {
    fn required_fields(&self) -> &'static [&'static str] {
        &["privateKey", "recipientAddress", "nftName", "nftDescription", "imageUrl"]
    }

    fn validate(&self, params: &ActionParams) -> Result<(), ActionError> {
        let mut missing = match params.require(self.required_fields()) {
            Ok(()) => Vec::new(),
            Err(ActionError::MissingField(fields)) => fields,
            Err(e) => return Err(e),
        };
        if !params.is_present("collectionAddress") {
            for field in ["collectionName", "collectionSymbol"] {
                if !params.is_present(field) {
                    missing.push(field.to_string());
                }
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ActionError::MissingField(missing))
        }
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let recipient = params.address("recipientAddress")?;
        let source = match params.opt_address("collectionAddress")? {
            Some(address) => CollectionSource::Existing(address),
            None => {
                ctx.config().nft_factory()?;
                CollectionSource::New {
                    name: params.required_text("collectionName")?,
                    symbol: params.required_text("collectionSymbol")?,
                    base_uri: params.text("baseURI").unwrap_or_default(),
                }
            }
        };
        let signer = params.signer()?;

        let uri = token_uri(params, "");
        let outcome = ctx
            .coordinator()
            .create_collection_and_mint(&signer, source, recipient, &uri)
            .await?;

        Ok(mint_output(outcome, uri).field("recipient", recipient.to_checksum()))
    }
}
