//! Crypto error types.

use thiserror::Error;

/// Result type for container operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while producing or opening an encrypted container.
///
/// Wrong passphrase, tampered ciphertext and mismatched parameters all
/// surface as [`CryptoError::Decryption`] — callers cannot tell which case
/// occurred.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),
}
