//! In-memory blob registry for decrypted payloads.
//!
//! Decrypted media and download bytes never go back into page markup; they
//! are published here under an opaque `blob:` URI and the element's
//! `src`/`href` is repointed at it. Embedders serve the bytes from the
//! registry (or hand them to an actual object-URL facility).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// URI prefix for registry entries.
pub const BLOB_SCHEME: &str = "blob:cloak/";

/// Registry mapping `blob:` URIs to plaintext payloads.
#[derive(Default)]
pub struct BlobStore {
    entries: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<Vec<u8>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes a payload and returns its freshly minted `blob:` URI.
    pub fn publish(&self, bytes: Vec<u8>) -> String {
        let uri = format!("{BLOB_SCHEME}{}", Uuid::new_v4());
        self.entries().insert(uri.clone(), Arc::new(bytes));
        uri
    }

    /// Looks up a published payload.
    pub fn get(&self, uri: &str) -> Option<Arc<Vec<u8>>> {
        self.entries().get(uri).cloned()
    }

    /// Number of published payloads.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
