//! Secret key handling and per-purpose key derivation.

use crate::{PaymentError, Result};
use hkdf::Hkdf;
use sha2::Sha256;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Application salt for turning passphrases into master keys.
const PASSPHRASE_SALT: &[u8] = b"payguard-passphrase-salt-v1";

/// HKDF info for the passphrase -> master key step.
const MASTER_KEY_INFO: &[u8] = b"payguard-master-key-v1";

/// HKDF info for the tokenization sub-key.
const TOKENIZATION_INFO: &[u8] = b"payguard-tokenization-v1";

/// HKDF info for the integrity-hash sub-key.
const INTEGRITY_INFO: &[u8] = b"payguard-integrity-v1";

/// 256-bit master key. Zeroized on drop; never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Wrap raw key bytes.
    ///
    /// # Security
    ///
    /// The bytes should come from a cryptographically secure random source
    /// or a KMS, never from a hardcoded constant.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a master key from a passphrase using HKDF-SHA256.
    ///
    /// The same passphrase always yields the same key, so tokens issued in
    /// one run can be detokenized in the next as long as the passphrase is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Configuration`] for an empty passphrase.
    pub fn from_passphrase(passphrase: &str) -> Result<Self> {
        if passphrase.is_empty() {
            return Err(PaymentError::configuration("secret key must not be empty"));
        }
        let hk = Hkdf::<Sha256>::new(Some(PASSPHRASE_SALT), passphrase.as_bytes());
        let mut key = [0u8; 32];
        hk.expand(MASTER_KEY_INFO, &mut key)
            .map_err(|e| PaymentError::Internal(format!("key derivation failed: {}", e)))?;
        Ok(Self(key))
    }

    /// Parse a 64-character hex key.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Configuration`] if the input is not 32 bytes of hex.
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|_| PaymentError::configuration("secret key is not valid hex"))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PaymentError::configuration("secret key must be 32 bytes"))?;
        Ok(Self(key))
    }

    /// Generate a random key.
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut key);
        Self(key)
    }

    /// Derive the per-purpose keys used by the codec and the hasher.
    pub(crate) fn derive_material(&self) -> Result<KeyMaterial> {
        Ok(KeyMaterial {
            tokenization: self.derive(TOKENIZATION_INFO)?,
            integrity: self.derive(INTEGRITY_INFO)?,
        })
    }

    fn derive(&self, info: &[u8]) -> Result<[u8; 32]> {
        let hk = Hkdf::<Sha256>::new(None, &self.0);
        let mut key = [0u8; 32];
        hk.expand(info, &mut key)
            .map_err(|e| PaymentError::Internal(format!("key derivation failed: {}", e)))?;
        Ok(key)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Sub-keys derived from one master key.
///
/// Tokenization and hashing never share a key, so a leaked integrity hash
/// oracle reveals nothing about the token cipher.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct KeyMaterial {
    pub(crate) tokenization: [u8; 32],
    pub(crate) integrity: [u8; 32],
}
