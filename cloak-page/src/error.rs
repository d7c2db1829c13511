//! Page engine error types.
//!
//! These never escape [`crate::engine::RevealEngine::decrypt_elements`]:
//! the engine catches per-element failures, logs them, and counts the
//! element as processed. They exist so the log sink and event stream can
//! say what went wrong.

use thiserror::Error;

/// Result type for page operations.
pub type PageResult<T> = Result<T, PageError>;

/// Errors that can occur while revealing one marked element.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] cloak_crypto::CryptoError),

    #[error("inline payload is not valid base64: {0}")]
    PayloadEncoding(#[from] base64::DecodeError),

    #[error("decrypted content is not valid UTF-8: {0}")]
    TextDecoding(#[from] std::string::FromUtf8Error),

    #[error("element has no source to fetch")]
    MissingSource,

    #[error("element lost its marker attribute")]
    MissingMarker,
}
