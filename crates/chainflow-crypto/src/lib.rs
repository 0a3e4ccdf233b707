//! # chainflow-crypto
//!
//! Cryptographic primitives consumed by the transaction pipeline.
//!
//! - Keccak-256 hashing
//! - [`Signer`]: private key -> address, recoverable ECDSA (secp256k1) signing
//! - Public key recovery, used to check signatures

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signer;

pub use error::CryptoError;
pub use hash::keccak256;
pub use signer::{public_key_to_address, recover_address, RecoverableSignature, Signer};
