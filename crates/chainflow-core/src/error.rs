//! Action error taxonomy

use chainflow_ledger::LedgerError;
use chainflow_primitives::{UnitsError, H256};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::composite::StepRecord;

/// Error category, which decides the HTTP status of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Missing or malformed input
    #[serde(rename = "ValidationError")]
    Validation,
    /// Insufficient balance or allowance
    #[serde(rename = "PreflightError")]
    Preflight,
    /// Expected on-chain event absent
    #[serde(rename = "NotFoundError")]
    NotFound,
    /// Caller lacks the required on-chain permission
    #[serde(rename = "OwnershipError")]
    Ownership,
    /// The node rejected or reverted a transaction
    #[serde(rename = "SubmissionError")]
    Submission,
    /// An RPC or contract read failed
    #[serde(rename = "NetworkError")]
    Network,
}

impl ErrorKind {
    /// HTTP status code for this category
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation | ErrorKind::Preflight => 400,
            ErrorKind::Ownership => 403,
            ErrorKind::NotFound | ErrorKind::Submission | ErrorKind::Network => 500,
        }
    }

    /// Name used in response envelopes
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Preflight => "PreflightError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Ownership => "OwnershipError",
            ErrorKind::Submission => "SubmissionError",
            ErrorKind::Network => "NetworkError",
        }
    }
}

/// Error raised while validating or executing an action
#[derive(Debug, Error)]
pub enum ActionError {
    /// Required request fields are absent
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingField(Vec<String>),

    /// One or more addresses failed to parse
    #[error("Invalid address: {}", .0.join(", "))]
    InvalidAddress(Vec<String>),

    /// Malformed input value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tool type outside the supported set
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Private key could not be parsed
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Balance does not cover the required amount
    #[error("Insufficient {asset} balance: have {balance}, need {required}")]
    InsufficientBalance {
        /// Asset symbol
        asset: String,
        /// Current balance
        balance: String,
        /// Required amount
        required: String,
        /// Missing amount
        shortfall: String,
    },

    /// The receipt carried no log for the expected event
    #[error("{event} event not found in transaction {tx_hash}")]
    ExpectedEventNotFound {
        /// Event name
        event: String,
        /// Transaction that should have emitted it
        tx_hash: String,
    },

    /// The signer does not own the contract it wants to act on
    #[error("Signer {caller} is not the owner of {contract}")]
    OwnershipMismatch {
        /// Contract address
        contract: String,
        /// On-chain owner
        owner: String,
        /// Signer address
        caller: String,
    },

    /// The node refused the transaction
    #[error("Transaction submission failed: {reason}")]
    SubmissionFailed {
        /// Provider reason
        reason: String,
        /// Provider error code
        code: Option<i64>,
    },

    /// The transaction was included but execution failed
    #[error("Transaction {tx_hash} reverted")]
    Reverted {
        /// Reverted transaction
        tx_hash: String,
    },

    /// The transaction was broadcast but its receipt could not be fetched
    #[error("Confirmation of {tx_hash} failed: {reason}")]
    ConfirmationFailed {
        /// Broadcast transaction
        tx_hash: String,
        /// Provider reason
        reason: String,
        /// Provider error code
        code: Option<i64>,
    },

    /// RPC or contract read failure
    #[error("Network error: {reason}")]
    Network {
        /// Provider reason
        reason: String,
        /// Provider error code
        code: Option<i64>,
    },

    /// A contract address the action needs is not configured
    #[error("{0} contract address is not configured")]
    NotConfigured(&'static str),

    /// A multi-step action stopped after some steps were confirmed
    #[error("{failed_step} failed after {} completed step(s): {source}", .completed.len())]
    CompositeIncomplete {
        /// Steps confirmed before the failure
        completed: Vec<StepRecord>,
        /// Name of the failed step
        failed_step: String,
        /// Cause
        source: Box<ActionError>,
    },
}

impl ActionError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::MissingField(_)
            | ActionError::InvalidAddress(_)
            | ActionError::InvalidInput(_)
            | ActionError::UnknownTool(_)
            | ActionError::InvalidPrivateKey
            | ActionError::NotConfigured(_) => ErrorKind::Validation,
            ActionError::InsufficientBalance { .. } => ErrorKind::Preflight,
            ActionError::ExpectedEventNotFound { .. } => ErrorKind::NotFound,
            ActionError::OwnershipMismatch { .. } => ErrorKind::Ownership,
            ActionError::SubmissionFailed { .. } | ActionError::Reverted { .. } => {
                ErrorKind::Submission
            }
            ActionError::Network { .. } | ActionError::ConfirmationFailed { .. } => {
                ErrorKind::Network
            }
            ActionError::CompositeIncomplete { source, .. } => source.kind(),
        }
    }

    /// HTTP status code
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Structured diagnostic payload for the failure envelope
    pub fn details(&self) -> Value {
        match self {
            ActionError::MissingField(fields) => json!({ "missingFields": fields }),
            ActionError::InvalidAddress(addresses) => json!({ "invalidAddresses": addresses }),
            ActionError::InsufficientBalance {
                asset,
                balance,
                required,
                shortfall,
            } => json!({
                "asset": asset,
                "balance": balance,
                "required": required,
                "shortfall": shortfall,
            }),
            ActionError::ExpectedEventNotFound { event, tx_hash } => json!({
                "event": event,
                "transactionHash": tx_hash,
            }),
            ActionError::OwnershipMismatch {
                contract,
                owner,
                caller,
            } => json!({
                "contract": contract,
                "owner": owner,
                "caller": caller,
            }),
            ActionError::SubmissionFailed { reason, code }
            | ActionError::Network { reason, code } => json!({
                "reason": reason,
                "code": code,
            }),
            ActionError::Reverted { tx_hash } => json!({ "transactionHash": tx_hash }),
            ActionError::ConfirmationFailed {
                tx_hash,
                reason,
                code,
            } => json!({
                "transactionHash": tx_hash,
                "reason": reason,
                "code": code,
            }),
            ActionError::CompositeIncomplete {
                completed,
                failed_step,
                source,
            } => json!({
                "completedSteps": completed,
                "failedStep": failed_step,
                "cause": {
                    "kind": source.kind(),
                    "error": source.to_string(),
                    "details": source.details(),
                },
            }),
            ActionError::InvalidInput(_)
            | ActionError::UnknownTool(_)
            | ActionError::InvalidPrivateKey
            | ActionError::NotConfigured(_) => Value::Null,
        }
    }

    /// Map an RPC failure during submission
    pub fn submission(err: LedgerError) -> Self {
        let code = err.code();
        let reason = match err {
            LedgerError::Rpc { message, .. } => message,
            other => other.to_string(),
        };
        ActionError::SubmissionFailed { reason, code }
    }

    /// Map an RPC failure while waiting for the receipt of `tx_hash`
    pub fn confirmation(tx_hash: &H256, err: LedgerError) -> Self {
        let code = err.code();
        let reason = match err {
            LedgerError::Rpc { message, .. } => message,
            other => other.to_string(),
        };
        ActionError::ConfirmationFailed {
            tx_hash: tx_hash.to_hex(),
            reason,
            code,
        }
    }
}

impl From<LedgerError> for ActionError {
    fn from(err: LedgerError) -> Self {
        let code = err.code();
        let reason = match err {
            LedgerError::Rpc { message, .. } => message,
            other => other.to_string(),
        };
        ActionError::Network { reason, code }
    }
}

impl From<UnitsError> for ActionError {
    fn from(err: UnitsError) -> Self {
        ActionError::InvalidInput(err.to_string())
    }
}
