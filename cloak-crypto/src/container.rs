//! Container assembly: the two public primitives.
//!
//! `encrypt` bundles parameter generation, key derivation and sealing into
//! a self-describing container; `decrypt` is its inverse and accepts the
//! parameters either decoded or still in wire form.

use crate::cipher;
use crate::error::CryptoResult;
use crate::key::derive_key;
use crate::params::{decode_params, encode_params, EncryptionParams};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Size of the random per-container salt in bytes.
pub const SALT_SIZE: usize = 16;

/// Options for [`encrypt`].
#[derive(Clone, Debug)]
pub struct EncryptOptions {
    /// PBKDF2 work factor.
    pub iterations: u32,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self { iterations: 100_000 }
    }
}

/// A complete encrypted unit: ciphertext plus its encoded parameters.
///
/// Decryption requires only this and the passphrase. The two halves are
/// stored separately in a page: the parameter string in the marker
/// attribute, the ciphertext as a fetched body or inline base64 text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedSecret {
    /// AES-GCM ciphertext with the tag appended.
    pub bytes: Vec<u8>,
    /// Encoded [`EncryptionParams`] wire string.
    pub params: String,
}

/// Parameters in either wire or decoded form.
#[derive(Clone, Copy, Debug)]
pub enum ParamsRef<'a> {
    Decoded(&'a EncryptionParams),
    Encoded(&'a str),
}

impl<'a> From<&'a EncryptionParams> for ParamsRef<'a> {
    fn from(params: &'a EncryptionParams) -> Self {
        ParamsRef::Decoded(params)
    }
}

impl<'a> From<&'a str> for ParamsRef<'a> {
    fn from(encoded: &'a str) -> Self {
        ParamsRef::Encoded(encoded)
    }
}

impl<'a> From<&'a String> for ParamsRef<'a> {
    fn from(encoded: &'a String) -> Self {
        ParamsRef::Encoded(encoded)
    }
}

/// Encrypts `data` under `password` into a self-describing container.
///
/// Salt and iv are drawn fresh from the OS random source on every call, so
/// two encryptions of identical input never produce identical output.
pub fn encrypt(data: &[u8], password: &str, opts: &EncryptOptions) -> CryptoResult<EncryptedSecret> {
    let mut salt = vec![0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let mut iv = vec![0u8; cipher::IV_SIZE];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt, opts.iterations)?;
    let bytes = cipher::seal(&key, &iv, data)?;

    let params = encode_params(&EncryptionParams {
        iterations: opts.iterations,
        salt,
        iv,
    })?;

    Ok(EncryptedSecret { bytes, params })
}

/// Recovers plaintext from container ciphertext.
///
/// `params` may be passed decoded or as the encoded wire string. Errors
/// propagate to the caller; nothing is caught here.
pub fn decrypt<'a>(
    bytes: &[u8],
    password: &str,
    params: impl Into<ParamsRef<'a>>,
) -> CryptoResult<Vec<u8>> {
    let decoded;
    let params = match params.into() {
        ParamsRef::Decoded(params) => params,
        ParamsRef::Encoded(encoded) => {
            decoded = decode_params(encoded)?;
            &decoded
        }
    };

    let key = derive_key(password, &params.salt, params.iterations)?;
    cipher::open(&key, &params.iv, bytes)
}
