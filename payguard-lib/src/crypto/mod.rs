//! Tokenization and Integrity Hashing
//!
//! [`PaymentCrypto`] owns the secret key and exposes the two keyed
//! operations of the engine:
//!
//! - **Tokenization**: a [`PaymentRecord`] is serialized canonically and
//!   sealed with AES-256-GCM into an opaque base64url [`Token`]. Only the
//!   same key can open it; any modification fails authentication.
//! - **Integrity hashing**: a string is hashed with HMAC-SHA256 and a fresh
//!   random salt into a [`HashedValue`], verified in constant time.
//!
//! Both use separate sub-keys derived from the master key with HKDF-SHA256.
//!
//! # Example
//!
//! ```
//! use payguard_lib::{PaymentCrypto, PaymentRecord};
//!
//! let crypto = PaymentCrypto::new();
//! crypto.set_secret_key("test-secret")?;
//!
//! let record = PaymentRecord::new()
//!     .with("card_number", "4111111111111111")
//!     .with("cvv", "123");
//! let token = crypto.tokenize(&record)?;
//! assert!(!token.as_str().contains("4111111111111111"));
//! assert_eq!(crypto.detokenize(&token)?, record);
//!
//! let hashed = crypto.hash_data("4111111111111111")?;
//! assert!(crypto.verify_hash("4111111111111111", &hashed)?);
//! # Ok::<(), payguard_lib::PaymentError>(())
//! ```

mod envelope;
mod hasher;
mod key;
mod record;

pub use hasher::HashedValue;
pub use key::SecretKey;
pub use record::{PaymentRecord, RecordValue, Token};

use crate::{PaymentError, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use key::KeyMaterial;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Environment variable read by [`PaymentCrypto::from_env`].
pub const SECRET_KEY_ENV: &str = "PAYGUARD_SECRET_KEY";

/// Keyed payment-data operations.
///
/// Share one context (e.g. behind an `Arc`) across threads. Replacing the
/// key is a single atomic swap: calls that already fetched the old key
/// finish with it, every later call sees the new one. Tokens issued under a
/// previous key can no longer be detokenized.
pub struct PaymentCrypto {
    keys: RwLock<Option<Arc<KeyMaterial>>>,
}

impl PaymentCrypto {
    /// Create a context with no key configured.
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(None),
        }
    }

    /// Create a context keyed from a passphrase.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Configuration`] for an empty passphrase.
    pub fn with_secret_key(passphrase: &str) -> Result<Self> {
        Self::with_key(SecretKey::from_passphrase(passphrase)?)
    }

    /// Create a context from an existing key.
    pub fn with_key(key: SecretKey) -> Result<Self> {
        let material = key.derive_material()?;
        Ok(Self {
            keys: RwLock::new(Some(Arc::new(material))),
        })
    }

    /// Create a context keyed from `PAYGUARD_SECRET_KEY`.
    ///
    /// An unset or empty variable yields a context without a key; keyed
    /// operations then fail with [`PaymentError::Configuration`].
    pub fn from_env() -> Result<Self> {
        match std::env::var(SECRET_KEY_ENV) {
            Ok(passphrase) if !passphrase.is_empty() => Self::with_secret_key(&passphrase),
            _ => {
                tracing::debug!("{} not set; crypto context starts without a key", SECRET_KEY_ENV);
                Ok(Self::new())
            }
        }
    }

    /// Configure the key from a passphrase.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Configuration`] for an empty passphrase; the
    /// previous key stays active in that case.
    pub fn set_secret_key(&self, passphrase: &str) -> Result<()> {
        self.set_key(SecretKey::from_passphrase(passphrase)?)
    }

    /// Configure the key from raw key material.
    pub fn set_key(&self, key: SecretKey) -> Result<()> {
        let material = Arc::new(key.derive_material()?);
        let mut slot = self
            .keys
            .write()
            .map_err(|e| PaymentError::Internal(format!("Lock poisoned: {}", e)))?;
        *slot = Some(material);
        tracing::debug!("secret key configured");
        Ok(())
    }

    /// Forget the key. Keyed operations fail until a new one is set.
    pub fn clear_secret_key(&self) -> Result<()> {
        let mut slot = self
            .keys
            .write()
            .map_err(|e| PaymentError::Internal(format!("Lock poisoned: {}", e)))?;
        *slot = None;
        tracing::debug!("secret key cleared");
        Ok(())
    }

    /// Whether a key is configured.
    pub fn has_secret_key(&self) -> bool {
        self.keys.read().map(|slot| slot.is_some()).unwrap_or(false)
    }

    fn active_keys(&self) -> Result<Arc<KeyMaterial>> {
        let slot = self
            .keys
            .read()
            .map_err(|e| PaymentError::Internal(format!("Lock poisoned: {}", e)))?;
        (*slot)
            .clone()
            .ok_or_else(|| PaymentError::configuration("secret key not set"))
    }

    /// Seal a record into an opaque token.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Configuration`] when no key is set.
    pub fn tokenize(&self, record: &PaymentRecord) -> Result<Token> {
        let keys = self.active_keys()?;
        let plaintext = zeroize::Zeroizing::new(record.to_canonical_bytes()?);
        let sealed = envelope::seal(&keys.tokenization, &plaintext)
            .map_err(|e| PaymentError::Internal(e.to_string()))?;
        let token = Token::new(URL_SAFE_NO_PAD.encode(sealed));
        tracing::debug!(
            fields = record.len(),
            token_len = token.as_str().len(),
            "payment record tokenized"
        );
        Ok(token)
    }

    /// Open a token produced by [`tokenize`](Self::tokenize) under the same key.
    ///
    /// # Errors
    ///
    /// - [`PaymentError::Configuration`] when no key is set.
    /// - [`PaymentError::TokenInvalid`] when the token is not base64url, is
    ///   truncated, has an unknown version, was sealed under another key, or
    ///   was modified.
    pub fn detokenize(&self, token: &Token) -> Result<PaymentRecord> {
        let keys = self.active_keys()?;
        let result = URL_SAFE_NO_PAD
            .decode(token.as_str())
            .map_err(|_| PaymentError::token_invalid("not valid base64url"))
            .and_then(|sealed| {
                envelope::open(&keys.tokenization, &sealed)
                    .map_err(|e| PaymentError::token_invalid(e.to_string()))
            })
            .and_then(|plaintext| {
                let plaintext = zeroize::Zeroizing::new(plaintext);
                PaymentRecord::from_canonical_bytes(&plaintext)
                    .map_err(|_| PaymentError::token_invalid("payload is not a payment record"))
            });

        match &result {
            Ok(record) => tracing::debug!(fields = record.len(), "token detokenized"),
            Err(e) => tracing::warn!(error = %e, "token rejected"),
        }
        result
    }

    /// Hash `data` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Configuration`] when no key is set.
    pub fn hash_data(&self, data: &str) -> Result<HashedValue> {
        let keys = self.active_keys()?;
        let hashed = hasher::hash_with(&keys.integrity, data)?;
        tracing::debug!(data_len = data.len(), "payment data hashed");
        Ok(hashed)
    }

    /// Check `data` against a hash from [`hash_data`](Self::hash_data).
    ///
    /// Malformed hash values yield `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Configuration`] when no key is set.
    pub fn verify_hash(&self, data: &str, hashed: &HashedValue) -> Result<bool> {
        self.verify_hash_str(data, hashed.as_str())
    }

    /// [`verify_hash`](Self::verify_hash) for a raw `salt:digest` string.
    pub fn verify_hash_str(&self, data: &str, hashed: &str) -> Result<bool> {
        let keys = self.active_keys()?;
        Ok(hasher::verify_with(&keys.integrity, data, hashed))
    }
}

impl Default for PaymentCrypto {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PaymentCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentCrypto")
            .field("has_secret_key", &self.has_secret_key())
            .finish()
    }
}
