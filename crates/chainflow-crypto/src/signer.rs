//! Account signing key

use chainflow_primitives::{Address, H256};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::{keccak256, CryptoError};

/// Recoverable secp256k1 signature over a 32-byte pre-hash
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    /// r component
    pub r: [u8; 32],
    /// s component (always in the lower half of the curve order)
    pub s: [u8; 32],
    /// Recovery id, 0 or 1
    pub recovery_id: u8,
}

/// Signing key for one account.
///
/// Built per request from the caller-supplied private key and dropped when the
/// request completes. `Clone` is deliberately not implemented.
pub struct Signer {
    key: SigningKey,
    address: Address,
}

impl Signer {
    /// Create a signer from a 32-byte private key
    pub fn from_bytes(key: &[u8; 32]) -> Result<Self, CryptoError> {
        let key = SigningKey::from_slice(key)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        let address = public_key_to_address(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Create a signer from a hex private key, with or without `0x`
    pub fn from_private_key_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut bytes =
            hex::decode(hex).map_err(|_| CryptoError::InvalidPrivateKey("not hex".to_string()))?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(CryptoError::InvalidPrivateKey(format!(
                "expected 32 bytes, got {}",
                len
            )));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();

        let signer = Self::from_bytes(&key);
        key.zeroize();
        signer
    }

    /// Address controlled by this key
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte pre-hash, normalising to low-s (EIP-2)
    pub fn sign_hash(&self, hash: &H256) -> Result<RecoverableSignature, CryptoError> {
        let (mut signature, mut recovery_id) = self
            .key
            .sign_prehash_recoverable(hash.as_bytes())
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        if let Some(normalized) = signature.normalize_s() {
            signature = normalized;
            recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
        }

        Ok(RecoverableSignature {
            r: signature.r().to_bytes().into(),
            s: signature.s().to_bytes().into(),
            recovery_id: recovery_id.to_byte(),
        })
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Derive an account address from a public key
pub fn public_key_to_address(public_key: &VerifyingKey) -> Address {
    // uncompressed point: 0x04 || x || y
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}

/// Recover the signing address of `signature` over `hash`
pub fn recover_address(
    hash: &H256,
    signature: &RecoverableSignature,
) -> Result<Address, CryptoError> {
    let sig = Signature::from_scalars(signature.r, signature.s)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_id).ok_or_else(|| {
        CryptoError::InvalidSignature(format!("recovery id {}", signature.recovery_id))
    })?;

    let key = VerifyingKey::recover_from_prehash(hash.as_bytes(), &sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    Ok(public_key_to_address(&key))
}

#[cfg(test)]
mod tests {
    use super::*;

    // well-known development key
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_signer_from_hex() {
        let signer = Signer::from_private_key_hex(DEV_KEY).unwrap();
        assert_eq!(
            signer.address().to_hex(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        let unprefixed = Signer::from_private_key_hex(&DEV_KEY[2..]).unwrap();
        assert_eq!(unprefixed.address(), signer.address());
    }

    #[test]
    fn test_signer_rejects_bad_keys() {
        assert!(Signer::from_private_key_hex("0x1234").is_err());
        assert!(Signer::from_private_key_hex("not a key").is_err());
        assert!(Signer::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_sign_and_recover() {
        let signer = Signer::from_private_key_hex(DEV_KEY).unwrap();
        let hash = keccak256(b"chainflow");
        let signature = signer.sign_hash(&hash).unwrap();

        assert!(signature.recovery_id <= 1);
        assert_eq!(recover_address(&hash, &signature).unwrap(), signer.address());
    }

    #[test]
    fn test_signatures_are_low_s() {
        use rand::RngCore;

        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        key[0] = 0x01; // keep it below the curve order
        let signer = Signer::from_bytes(&key).unwrap();

        // n / 2
        let half_order: [u8; 32] = [
            0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46,
            0x68, 0x1B, 0x20, 0xA0,
        ];
        for i in 0..16u8 {
            let hash = keccak256(&[i]);
            let signature = signer.sign_hash(&hash).unwrap();
            assert!(signature.s <= half_order);
            assert_eq!(recover_address(&hash, &signature).unwrap(), signer.address());
        }
    }

    #[test]
    fn test_debug_hides_key() {
        let signer = Signer::from_private_key_hex(DEV_KEY).unwrap();
        let debug = format!("{:?}", signer);
        assert!(debug.contains("address"));
        assert!(!debug.contains("ac0974"));
    }
}
