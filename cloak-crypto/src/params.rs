//! Encryption parameter codec.
//!
//! Parameters travel alongside each container as a compact base64 string so
//! a passphrase is the only other input needed for decryption. The binary
//! layout is fixed (no version field):
//! - iterations: 4 bytes little-endian
//! - salt length: 2 bytes little-endian
//! - salt: variable
//! - iv length: 2 bytes little-endian
//! - iv: variable

use crate::error::{CryptoError, CryptoResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Key-derivation and cipher parameters for one encrypted payload.
///
/// Created once with a fresh random salt/iv at encryption time and never
/// mutated afterwards. Salt and iv lengths must each fit in 16 bits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionParams {
    pub iterations: u32,
    pub salt: Vec<u8>,
    pub iv: Vec<u8>,
}

/// Encodes parameters into the base64 wire string.
///
/// Fails only if the salt or iv is too long for its 16-bit length field.
pub fn encode_params(params: &EncryptionParams) -> CryptoResult<String> {
    let salt_len = u16::try_from(params.salt.len())
        .map_err(|_| CryptoError::Encryption("salt length exceeds u16 range".to_string()))?;
    let iv_len = u16::try_from(params.iv.len())
        .map_err(|_| CryptoError::Encryption("iv length exceeds u16 range".to_string()))?;

    let mut data = Vec::with_capacity(8 + params.salt.len() + params.iv.len());
    data.extend_from_slice(&params.iterations.to_le_bytes());
    data.extend_from_slice(&salt_len.to_le_bytes());
    data.extend_from_slice(&params.salt);
    data.extend_from_slice(&iv_len.to_le_bytes());
    data.extend_from_slice(&params.iv);

    Ok(STANDARD.encode(data))
}

/// Decodes a base64 wire string back into parameters.
///
/// Declared lengths are checked against the remaining buffer, and trailing
/// bytes after the iv are rejected. A malformed string reports as
/// [`CryptoError::Decryption`] like any other undecryptable input.
pub fn decode_params(encoded: &str) -> CryptoResult<EncryptionParams> {
    let data = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CryptoError::Decryption(format!("parameter base64 decoding failed: {e}")))?;

    let mut reader = ByteReader::new(&data);
    let iterations = u32::from_le_bytes(reader.take_array("iterations")?);
    let salt_len = u16::from_le_bytes(reader.take_array("salt length")?) as usize;
    let salt = reader.take("salt", salt_len)?.to_vec();
    let iv_len = u16::from_le_bytes(reader.take_array("iv length")?) as usize;
    let iv = reader.take("iv", iv_len)?.to_vec();
    reader.finish()?;

    Ok(EncryptionParams { iterations, salt, iv })
}

/// Cursor over the raw parameter block with truncation checks.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, field: &str, len: usize) -> CryptoResult<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.data.len());
        match end {
            Some(end) => {
                let slice = &self.data[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(CryptoError::Decryption(format!(
                "parameter block truncated while reading {field}"
            ))),
        }
    }

    fn take_array<const N: usize>(&mut self, field: &str) -> CryptoResult<[u8; N]> {
        let slice = self.take(field, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn finish(&self) -> CryptoResult<()> {
        if self.pos < self.data.len() {
            return Err(CryptoError::Decryption(
                "unexpected data after parameter block".to_string(),
            ));
        }
        Ok(())
    }
}
