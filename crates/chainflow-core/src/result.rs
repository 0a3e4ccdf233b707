//! Response envelopes

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::config::NetworkConfig;
use crate::error::ActionError;
use crate::pipeline::TransactionOutcome;

/// Action-specific result fields, plus the transaction that produced them
#[derive(Debug, Clone, Default)]
pub struct ActionOutput {
    fields: Map<String, Value>,
    transaction: Option<TransactionOutcome>,
}

impl ActionOutput {
    /// Empty output
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Attach the transaction whose hash, block and gas go into the envelope
    pub fn transaction(mut self, outcome: &TransactionOutcome) -> Self {
        self.transaction = Some(outcome.clone());
        self
    }

    /// Field lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Attached transaction
    pub fn outcome(&self) -> Option<&TransactionOutcome> {
        self.transaction.as_ref()
    }
}

/// Status code plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse {
    /// HTTP status
    pub status: u16,
    /// Envelope
    pub body: Value,
}

impl ActionResponse {
    /// Whether the envelope reports success
    pub fn is_success(&self) -> bool {
        self.body["success"] == Value::Bool(true)
    }
}

/// Builds `{ success, ... }` envelopes
#[derive(Debug, Clone)]
pub struct ResultAssembler {
    config: Arc<NetworkConfig>,
}

impl ResultAssembler {
    /// Create an assembler
    pub fn new(config: Arc<NetworkConfig>) -> Self {
        Self { config }
    }

    /// Success envelope. Chain integers other than the block number are
    /// rendered as decimal strings.
    pub fn success(&self, output: ActionOutput) -> ActionResponse {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(true));
        body.extend(output.fields);

        if let Some(outcome) = output.transaction {
            body.insert(
                "transactionHash".to_string(),
                Value::String(outcome.tx_hash.to_hex()),
            );
            body.insert("blockNumber".to_string(), Value::from(outcome.block_number));
            body.insert(
                "gasUsed".to_string(),
                Value::String(outcome.gas_used.to_string()),
            );
            body.insert(
                "explorerUrl".to_string(),
                Value::String(self.config.explorer_tx_url(&outcome.tx_hash)),
            );
        }

        ActionResponse {
            status: 200,
            body: Value::Object(body),
        }
    }

    /// Failure envelope
    pub fn failure(&self, err: &ActionError) -> ActionResponse {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(false));
        body.insert("error".to_string(), Value::String(err.to_string()));
        body.insert(
            "kind".to_string(),
            Value::String(err.kind().as_str().to_string()),
        );
        body.insert("details".to_string(), err.details());

        ActionResponse {
            status: err.status_code(),
            body: Value::Object(body),
        }
    }

    /// Envelope for either outcome
    pub fn assemble(&self, result: Result<ActionOutput, ActionError>) -> ActionResponse {
        match result {
            Ok(output) => self.success(output),
            Err(err) => {
                warn!(kind = err.kind().as_str(), error = %err, "action failed");
                self.failure(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::GasPlan;
    use chainflow_primitives::{H256, U256};
    use serde_json::json;

    fn assembler() -> ResultAssembler {
        ResultAssembler::new(Arc::new(NetworkConfig::default()))
    }

    #[test]
    fn test_success_envelope() {
        let outcome = TransactionOutcome {
            tx_hash: H256::from_bytes([0x11; 32]),
            block_number: 42,
            gas_used: U256::from_dec_str("123456789012345678901234567890").unwrap(),
            gas_plan: GasPlan::NetworkDefault { limit: 500_000 },
            logs: vec![],
        };
        let output = ActionOutput::new()
            .field("amount", "1.5")
            .transaction(&outcome);

        let response = assembler().success(output);
        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.body["amount"], "1.5");
        assert_eq!(response.body["blockNumber"], 42);
        assert_eq!(response.body["gasUsed"], "123456789012345678901234567890");
        assert_eq!(
            response.body["explorerUrl"],
            format!(
                "https://shannon-explorer.somnia.network/tx/0x{}",
                "11".repeat(32)
            )
        );
    }

    #[test]
    fn test_read_only_success_has_no_transaction_fields() {
        let response = assembler().success(ActionOutput::new().field("balance", "0.0"));
        assert_eq!(response.body, json!({ "success": true, "balance": "0.0" }));
    }

    #[test]
    fn test_failure_envelope() {
        let err = ActionError::InvalidAddress(vec!["0xBAD".to_string()]);
        let response = assembler().assemble(Err(err));
        assert_eq!(response.status, 400);
        assert!(!response.is_success());
        assert_eq!(response.body["kind"], "ValidationError");
        assert_eq!(response.body["details"]["invalidAddresses"][0], "0xBAD");
        assert_eq!(response.body["error"], "Invalid address: 0xBAD");
    }
}
