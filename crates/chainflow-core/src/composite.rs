//! Actions that need more than one transaction.
//!
//! Steps run in order and each waits for the previous one to confirm.
//! Nothing is rolled back: when a later step fails, the confirmed steps are
//! reported in [`ActionError::CompositeIncomplete`] so the caller can resume.

use std::sync::Arc;

use chainflow_crypto::Signer;
use chainflow_ledger::abi::Token;
use chainflow_ledger::{abis, LedgerClient};
use chainflow_primitives::{parse_ether, Address, U256};
use serde::Serialize;
use tracing::info;

use crate::config::NetworkConfig;
use crate::error::ActionError;
use crate::pipeline::{extract_event, CallSpec, Preflight, TransactionOutcome, TransactionPipeline};

/// Confirmed step of a multi-transaction action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// Step name
    pub step: String,
    /// Transaction hash
    pub transaction_hash: String,
    /// Including block
    pub block_number: u64,
    /// Address the step produced, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

impl StepRecord {
    pub(crate) fn confirmed(
        step: &str,
        outcome: &TransactionOutcome,
        contract: Option<Address>,
    ) -> Self {
        Self {
            step: step.to_string(),
            transaction_hash: outcome.tx_hash.to_hex(),
            block_number: outcome.block_number,
            contract_address: contract.map(|a| a.to_checksum()),
        }
    }
}

/// Collection to mint into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSource {
    /// Already deployed
    Existing(Address),
    /// Deploy through the NFT factory first
    New {
        /// Collection name
        name: String,
        /// Collection symbol
        symbol: String,
        /// Base token URI
        base_uri: String,
    },
}

/// Result of a collection deployment
#[derive(Debug, Clone)]
pub struct DeployedCollection {
    /// New collection
    pub address: Address,
    /// Deployment transaction
    pub outcome: TransactionOutcome,
}

/// Result of create-collection-and-mint
#[derive(Debug, Clone)]
pub struct MintOutcome {
    /// Collection minted into
    pub collection: Address,
    /// Whether the collection was deployed by this action
    pub created: bool,
    /// Minted token id, when the Transfer log was found
    pub token_id: Option<U256>,
    /// Confirmed steps, in order
    pub steps: Vec<StepRecord>,
    /// Mint transaction
    pub mint: TransactionOutcome,
}

/// Result of a batch airdrop
#[derive(Debug, Clone)]
pub struct AirdropOutcome {
    /// Recipients, in request order
    pub recipients: Vec<Address>,
    /// Wei per recipient
    pub amount_per_recipient: U256,
    /// Wei attached to the transaction, fees included
    pub total_value: U256,
    /// Airdrop transaction
    pub outcome: TransactionOutcome,
}

/// Sequences dependent pipeline runs
#[derive(Debug, Clone)]
pub struct CompositeActionCoordinator {
    pipeline: TransactionPipeline,
    client: Arc<LedgerClient>,
    config: Arc<NetworkConfig>,
}

impl CompositeActionCoordinator {
    /// Create a coordinator
    pub fn new(client: Arc<LedgerClient>, config: Arc<NetworkConfig>) -> Self {
        Self {
            pipeline: TransactionPipeline::new(client.clone(), config.clone()),
            client,
            config,
        }
    }

    /// Deploy a collection through the NFT factory and read its address from
    /// the `CollectionCreated` log
    pub async fn deploy_collection(
        &self,
        signer: &Signer,
        name: &str,
        symbol: &str,
        base_uri: &str,
    ) -> Result<DeployedCollection, ActionError> {
        let factory = self.config.nft_factory()?;
        let data = abis::nft_factory().encode_call(
            "createCollection",
            &[
                Token::String(name.to_string()),
                Token::String(symbol.to_string()),
                Token::String(base_uri.to_string()),
            ],
        )?;
        let spec = CallSpec::contract_call("deploy_collection", factory, data).with_preflight(
            Preflight::Native {
                required: U256::one(),
            },
        );

        let outcome = self.pipeline.execute(signer, &spec).await?.outcome;
        let event = extract_event(abis::nft_factory(), &outcome, "CollectionCreated")?;
        let address = event
            .address_arg("collectionAddress")
            .ok_or_else(|| ActionError::ExpectedEventNotFound {
                event: "CollectionCreated".to_string(),
                tx_hash: outcome.tx_hash.to_hex(),
            })?;

        info!(collection = %address, tx_hash = %outcome.tx_hash, "collection deployed");
        Ok(DeployedCollection { address, outcome })
    }

    /// Optionally deploy a collection, check the signer owns it, then mint
    /// one token to `recipient`
    pub async fn create_collection_and_mint(
        &self,
        signer: &Signer,
        source: CollectionSource,
        recipient: Address,
        metadata_uri: &str,
    ) -> Result<MintOutcome, ActionError> {
        let mut steps = Vec::new();

        let (collection, created) = match source {
            CollectionSource::Existing(address) => (address, false),
            CollectionSource::New {
                name,
                symbol,
                base_uri,
            } => {
                let deployed = self
                    .deploy_collection(signer, &name, &symbol, &base_uri)
                    .await?;
                steps.push(StepRecord::confirmed(
                    "deploy_collection",
                    &deployed.outcome,
                    Some(deployed.address),
                ));
                (deployed.address, true)
            }
        };

        if let Err(e) = self.verify_owner(signer, collection).await {
            return Err(incomplete(steps, "verify_owner", e));
        }

        let minted = match self.mint(signer, collection, recipient, metadata_uri).await {
            Ok(minted) => minted,
            Err(e) => return Err(incomplete(steps, "mint", e)),
        };
        steps.push(StepRecord::confirmed("mint", &minted.0, None));

        Ok(MintOutcome {
            collection,
            created,
            token_id: minted.1,
            steps,
            mint: minted.0,
        })
    }

    async fn verify_owner(&self, signer: &Signer, collection: Address) -> Result<(), ActionError> {
        let output = self
            .client
            .read(collection, abis::nft_collection(), "owner", &[])
            .await?;
        let owner = output
            .first()
            .and_then(Token::as_address)
            .ok_or_else(|| ActionError::Network {
                reason: "owner() returned no value".to_string(),
                code: None,
            })?;

        if owner != signer.address() {
            return Err(ActionError::OwnershipMismatch {
                contract: collection.to_checksum(),
                owner: owner.to_checksum(),
                caller: signer.address().to_checksum(),
            });
        }
        Ok(())
    }

    async fn mint(
        &self,
        signer: &Signer,
        collection: Address,
        recipient: Address,
        metadata_uri: &str,
    ) -> Result<(TransactionOutcome, Option<U256>), ActionError> {
        let data = abis::nft_collection().encode_call(
            "mint",
            &[
                Token::Address(recipient),
                Token::String(metadata_uri.to_string()),
            ],
        )?;
        let spec = CallSpec::contract_call("mint", collection, data);
        let outcome = self.pipeline.execute(signer, &spec).await?.outcome;

        let token_id = abis::nft_collection()
            .find_event(&outcome.logs, "Transfer")
            .and_then(|event| event.uint_arg("tokenId"));
        Ok((outcome, token_id))
    }

    /// Send `amount` (native, decimal) to every recipient in one transaction.
    ///
    /// All recipients are validated before any network call; the balance
    /// check covers `(amount + fee) * recipients`.
    pub async fn airdrop(
        &self,
        signer: &Signer,
        recipients: &[String],
        amount: &str,
    ) -> Result<AirdropOutcome, ActionError> {
        let recipients = parse_recipients(recipients)?;

        let amount_per_recipient = parse_ether(amount)?;
        if amount_per_recipient.is_zero() {
            return Err(ActionError::InvalidInput(
                "amount must be greater than zero".to_string(),
            ));
        }
        let contract = self.config.airdrop_contract()?;

        let fee = U256::from(self.config.airdrop_fee_per_recipient);
        let total_value = amount_per_recipient
            .checked_add(fee)
            .and_then(|per| per.checked_mul(U256::from(recipients.len())))
            .ok_or_else(|| ActionError::InvalidInput("airdrop total overflows".to_string()))?;

        let data = abis::airdrop().encode_call(
            "airdrop",
            &[
                Token::Array(recipients.iter().copied().map(Token::Address).collect()),
                Token::Uint(amount_per_recipient),
            ],
        )?;
        let spec = CallSpec::contract_call("airdrop", contract, data)
            .with_value(total_value)
            .with_preflight(Preflight::Native {
                required: total_value,
            });

        let outcome = self.pipeline.execute(signer, &spec).await?.outcome;
        info!(recipients = recipients.len(), tx_hash = %outcome.tx_hash, "airdrop confirmed");

        Ok(AirdropOutcome {
            recipients,
            amount_per_recipient,
            total_value,
            outcome,
        })
    }
}

/// Parse every recipient, reporting all bad entries at once
pub fn parse_recipients(recipients: &[String]) -> Result<Vec<Address>, ActionError> {
    if recipients.is_empty() {
        return Err(ActionError::InvalidInput(
            "recipients must not be empty".to_string(),
        ));
    }

    let mut parsed = Vec::with_capacity(recipients.len());
    let mut invalid = Vec::new();
    for raw in recipients {
        match Address::parse_checked(raw) {
            Ok(address) => parsed.push(address),
            Err(_) => invalid.push(raw.clone()),
        }
    }

    if invalid.is_empty() {
        Ok(parsed)
    } else {
        Err(ActionError::InvalidAddress(invalid))
    }
}

/// Wrap `err` with the confirmed steps, if there are any
fn incomplete(completed: Vec<StepRecord>, failed_step: &str, err: ActionError) -> ActionError {
    if completed.is_empty() {
        return err;
    }
    ActionError::CompositeIncomplete {
        completed,
        failed_step: failed_step.to_string(),
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipients_reports_all_bad_entries() {
        let recipients = vec![
            "0xBAD".to_string(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string(),
            "nope".to_string(),
        ];
        match parse_recipients(&recipients) {
            Err(ActionError::InvalidAddress(bad)) => assert_eq!(bad, vec!["0xBAD", "nope"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_recipients_rejects_empty() {
        assert!(matches!(
            parse_recipients(&[]),
            Err(ActionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_incomplete_without_steps_is_the_cause() {
        let err = incomplete(vec![], "mint", ActionError::InvalidPrivateKey);
        assert!(matches!(err, ActionError::InvalidPrivateKey));
    }
}
