//! Salted integrity hashes.
//!
//! Format: `<salt hex>:<digest hex>` where the digest is
//! HMAC-SHA256(integrity key, salt || data). The salt is fresh for every
//! call, so hashing the same data twice yields two different values that
//! both verify.

use crate::{PaymentError, Result};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Salt size in bytes.
pub(crate) const SALT_SIZE: usize = 16;

/// Digest size in bytes.
const DIGEST_SIZE: usize = 32;

/// A `salt:digest` integrity hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedValue(String);

impl HashedValue {
    /// Wrap a stored hash string. No validation happens here; a malformed
    /// value simply never verifies.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded `salt:digest` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex-encoded salt, if the value has a separator.
    pub fn salt_hex(&self) -> Option<&str> {
        self.0.split_once(':').map(|(salt, _)| salt)
    }

    /// The hex-encoded digest, if the value has a separator.
    pub fn digest_hex(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, digest)| digest)
    }
}

impl fmt::Display for HashedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for HashedValue {
    fn from(s: String) -> Self {
        Self(s)
    }
}

fn digest(key: &[u8; 32], salt: &[u8], data: &[u8]) -> Result<[u8; DIGEST_SIZE]> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| PaymentError::Internal(format!("hmac init failed: {}", e)))?;
    mac.update(salt);
    mac.update(data);
    let mut out = [0u8; DIGEST_SIZE];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Hash `data` with a fresh random salt.
pub(crate) fn hash_with(key: &[u8; 32], data: &str) -> Result<HashedValue> {
    let mut salt = [0u8; SALT_SIZE];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut salt);
    let digest = digest(key, &salt, data.as_bytes())?;
    Ok(HashedValue(format!(
        "{}:{}",
        hex::encode(salt),
        hex::encode(digest)
    )))
}

/// Check `data` against an encoded hash. Malformed input is `false`.
pub(crate) fn verify_with(key: &[u8; 32], data: &str, encoded: &str) -> bool {
    let Some((salt_hex, digest_hex)) = encoded.split_once(':') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
        return false;
    };
    if salt.is_empty() || expected.len() != DIGEST_SIZE {
        return false;
    }
    match digest(key, &salt, data.as_bytes()) {
        Ok(computed) => computed[..].ct_eq(&expected[..]).into(),
        Err(_) => false,
    }
}
