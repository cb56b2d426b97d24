//! AES-256-GCM envelope used by the tokenization codec.
//!
//! # Wire Format
//!
//! ```text
//! [1 byte version][12 bytes nonce][N bytes ciphertext][16 bytes auth tag]
//! ```
//!
//! Version 1 uses AES-256-GCM with random nonces and binds the version byte
//! as associated data, so it cannot be swapped without failing
//! authentication.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};

/// Current envelope format version.
pub(crate) const ENVELOPE_VERSION: u8 = 1;

/// Size of the nonce in bytes (96 bits for GCM).
pub(crate) const NONCE_SIZE: usize = 12;

/// Size of the authentication tag in bytes.
pub(crate) const TAG_SIZE: usize = 16;

/// Domain tag mixed into the associated data.
const ENVELOPE_DOMAIN: &[u8] = b"PAYGUARD_TOKEN";

/// Envelope error types.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CipherError {
    #[error("Encryption failed: {0}")]
    EncryptFailed(String),
    #[error("Decryption failed: {0}")]
    DecryptFailed(String),
    #[error("Invalid ciphertext format")]
    InvalidFormat,
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u8),
}

fn associated_data(version: u8) -> Vec<u8> {
    let mut aad = Vec::with_capacity(ENVELOPE_DOMAIN.len() + 1);
    aad.extend_from_slice(ENVELOPE_DOMAIN);
    aad.push(version);
    aad
}

/// Encrypt `plaintext` under `key` into the wire format above.
pub(crate) fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CipherError::EncryptFailed(e.to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let aad = associated_data(ENVELOPE_VERSION);
    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .map_err(|e| CipherError::EncryptFailed(e.to_string()))?;

    let mut result = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len());
    result.push(ENVELOPE_VERSION);
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Decrypt and authenticate an envelope produced by [`seal`].
pub(crate) fn open(key: &[u8; 32], envelope: &[u8]) -> Result<Vec<u8>, CipherError> {
    if envelope.len() < 1 + NONCE_SIZE + TAG_SIZE {
        return Err(CipherError::InvalidFormat);
    }

    let version = envelope[0];
    if version != ENVELOPE_VERSION {
        return Err(CipherError::UnsupportedVersion(version));
    }

    let nonce = Nonce::from_slice(&envelope[1..1 + NONCE_SIZE]);
    let encrypted = &envelope[1 + NONCE_SIZE..];

    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CipherError::DecryptFailed(e.to_string()))?;
    let aad = associated_data(version);
    cipher
        .decrypt(
            nonce,
            Payload {
                msg: encrypted,
                aad: &aad,
            },
        )
        .map_err(|_| CipherError::DecryptFailed("Authentication failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        key
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let key = test_key();
        let sealed = seal(&key, b"card_number=4111111111111111").unwrap();
        assert_eq!(open(&key, &sealed).unwrap(), b"card_number=4111111111111111");
    }

    #[test]
    fn test_envelope_format() {
        let sealed = seal(&test_key(), b"test").unwrap();
        assert_eq!(sealed.len(), 1 + NONCE_SIZE + 4 + TAG_SIZE);
        assert_eq!(sealed[0], ENVELOPE_VERSION);
    }

    #[test]
    fn test_random_nonces() {
        let key = test_key();
        assert_ne!(seal(&key, b"same").unwrap(), seal(&key, b"same").unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = seal(&test_key(), b"secret").unwrap();
        let result = open(&[9u8; 32], &sealed);
        assert!(matches!(result, Err(CipherError::DecryptFailed(_))));
    }

    #[test]
    fn test_tampering_detected() {
        let key = test_key();
        let mut sealed = seal(&key, b"secret").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 1;
        assert!(open(&key, &sealed).is_err());

        let mut sealed = seal(&key, b"secret").unwrap();
        sealed[1] ^= 0x80;
        assert!(open(&key, &sealed).is_err());
    }

    #[test]
    fn test_invalid_format_rejected() {
        let key = test_key();
        assert!(matches!(
            open(&key, &[1, 2, 3]),
            Err(CipherError::InvalidFormat)
        ));

        let mut bad_version = vec![99u8];
        bad_version.extend_from_slice(&[0u8; 28]);
        assert!(matches!(
            open(&key, &bad_version),
            Err(CipherError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = test_key();
        let sealed = seal(&key, b"").unwrap();
        assert!(open(&key, &sealed).unwrap().is_empty());
    }
}
