//! Cryptographic errors

use thiserror::Error;

/// Cryptographic operation error
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material could not be parsed
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Signing failed
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Signature could not be parsed
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Recovery failed
    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),
}
