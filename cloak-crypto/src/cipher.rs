//! Authenticated encryption under a derived key.
//!
//! AES-256-GCM with the 16-byte authentication tag appended to the
//! ciphertext, the same convention WebCrypto and the authoring tools use.
//! Decryption never releases unverified plaintext: a wrong key, wrong iv,
//! tampered or truncated input all fail with a single error kind.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};

/// Size of the GCM nonce in bytes (96 bits).
pub const IV_SIZE: usize = 12;

/// Size of the appended Poly1305-style GCM tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypts `plaintext`, returning ciphertext with the tag appended.
pub fn seal(key: &DerivedKey, iv: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    if iv.len() != IV_SIZE {
        return Err(CryptoError::Encryption(format!(
            "iv must be {IV_SIZE} bytes, got {}",
            iv.len()
        )));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|e| CryptoError::Encryption(format!("AES-GCM seal failed: {e}")))
}

/// Decrypts and verifies `ciphertext` (tag appended).
pub fn open(key: &DerivedKey, iv: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    if iv.len() != IV_SIZE {
        return Err(CryptoError::Decryption(format!(
            "iv must be {IV_SIZE} bytes, got {}",
            iv.len()
        )));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| {
            CryptoError::Decryption("wrong passphrase or tampered data".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::derive_key;

    fn test_key(password: &str) -> DerivedKey {
        derive_key(password, b"fixed-test-salt!", 1000).unwrap()
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = test_key("pw");
        let iv = [7u8; IV_SIZE];
        let sealed = seal(&key, &iv, b"payload").unwrap();
        assert_eq!(sealed.len(), b"payload".len() + TAG_SIZE);
        assert_eq!(open(&key, &iv, &sealed).unwrap(), b"payload");
    }

    #[test]
    fn wrong_key_fails() {
        let iv = [7u8; IV_SIZE];
        let sealed = seal(&test_key("a"), &iv, b"payload").unwrap();
        assert!(matches!(
            open(&test_key("b"), &iv, &sealed),
            Err(CryptoError::Decryption(_))
        ));
    }

    #[test]
    fn wrong_iv_fails() {
        let key = test_key("pw");
        let sealed = seal(&key, &[7u8; IV_SIZE], b"payload").unwrap();
        assert!(open(&key, &[8u8; IV_SIZE], &sealed).is_err());
    }

    #[test]
    fn bad_iv_length_rejected() {
        let key = test_key("pw");
        assert!(seal(&key, &[0u8; 11], b"x").is_err());
        assert!(open(&key, &[0u8; 16], b"whatever").is_err());
    }

    #[test]
    fn ciphertext_shorter_than_tag_fails() {
        let key = test_key("pw");
        assert!(open(&key, &[0u8; IV_SIZE], &[0u8; TAG_SIZE - 1]).is_err());
    }
}
