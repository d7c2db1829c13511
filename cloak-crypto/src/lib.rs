//! Encrypted container format for Cloak.
//!
//! Turns a passphrase plus a compact parameter blob plus ciphertext bytes
//! back into plaintext, and produces the same containers at authoring time:
//! - PBKDF2-HMAC-SHA256 for key derivation from the passphrase
//! - AES-256-GCM for authenticated encryption (tag appended)
//! - a fixed-layout base64 parameter codec carried next to each payload
//!
//! A container is self-describing: ciphertext plus the parameter string is
//! everything decryption needs besides the passphrase. Authenticity comes
//! solely from the GCM tag — a wrong passphrase or tampered payload fails,
//! it never yields garbage that looks like success.

mod cipher;
mod container;
mod error;
mod key;
mod params;

pub use cipher::{IV_SIZE, TAG_SIZE};
pub use container::{decrypt, encrypt, EncryptOptions, EncryptedSecret, ParamsRef, SALT_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, DerivedKey, KEY_SIZE};
pub use params::{decode_params, encode_params, EncryptionParams};
