//! Ledger error types

use thiserror::Error;

/// Error raised by the ledger collaborators (RPC, ABI, signing)
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Transport/network error
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON-RPC error returned by the node
    #[error("RPC error: {code} - {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
        /// Optional error payload (revert data, provider detail)
        data: Option<String>,
    },

    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Signing failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// ABI encoding error
    #[error("ABI encoding error: {0}")]
    AbiEncode(String),

    /// ABI decoding error
    #[error("ABI decoding error: {0}")]
    AbiDecode(String),

    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid chain ID
    #[error("Invalid chain ID: {0}")]
    InvalidChainId(String),

    /// Node answered with something we could not interpret
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl LedgerError {
    /// Provider error code, when the node supplied one
    pub fn code(&self) -> Option<i64> {
        match self {
            LedgerError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<hex::FromHexError> for LedgerError {
    fn from(e: hex::FromHexError) -> Self {
        LedgerError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

impl From<chainflow_crypto::CryptoError> for LedgerError {
    fn from(e: chainflow_crypto::CryptoError) -> Self {
        LedgerError::Signing(e.to_string())
    }
}

impl From<chainflow_primitives::AddressError> for LedgerError {
    fn from(e: chainflow_primitives::AddressError) -> Self {
        LedgerError::InvalidAddress(e.to_string())
    }
}

impl From<chainflow_primitives::HashError> for LedgerError {
    fn from(e: chainflow_primitives::HashError) -> Self {
        LedgerError::InvalidHex(e.to_string())
    }
}
