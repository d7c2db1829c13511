//! Passphrase key derivation.

use crate::error::{CryptoError, CryptoResult};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of derived keys in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// A symmetric key derived from a passphrase.
///
/// The raw bytes stay inside this crate and are zeroized on drop; the only
/// thing a holder can do with the key is seal or open payloads.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DerivedKey").field(&"<redacted>").finish()
    }
}

/// Derives a 256-bit key from a passphrase using PBKDF2-HMAC-SHA256.
///
/// Never retries internally; derivation is cheap to recompute by the
/// caller. An iteration count of zero is rejected up front.
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> CryptoResult<DerivedKey> {
    if iterations == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be positive".to_string(),
        ));
    }

    let mut out = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    Ok(DerivedKey(out))
}
