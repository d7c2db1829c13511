//! Reveal engine for Cloak.
//!
//! Walks a page tree for elements marked as carrying encrypted content,
//! decrypts each one with the visitor's passphrase, and substitutes the
//! plaintext back in place:
//! - media and download references are fetched, decrypted, and repointed at
//!   a local blob URI
//! - inline content is decoded from base64, decrypted, substituted as text,
//!   and re-scanned for nested secrets
//!
//! All elements are processed concurrently; a single `decrypted` event
//! fires once the whole batch — including elements discovered mid-flight —
//! has been processed. Containers come from [`cloak_crypto`].

pub mod activation;
pub mod blob;
pub mod dom;
pub mod engine;
pub mod error;
pub mod fetch;

pub use activation::{extract_passphrase, Activation, DEFAULT_PASSWORD_PARAM};
pub use blob::{BlobStore, BLOB_SCHEME};
pub use dom::{Dom, NodeId, TreeDocument};
pub use engine::{
    classify, ElementRole, EngineConfig, RevealEngine, RevealEvent, SharedDom, COMPLETION_EVENT,
    MARKER_ATTR, WITNESS_ATTR,
};
pub use error::{PageError, PageResult};
pub use fetch::{FetchedBody, FsFetcher, HttpFetcher, ResourceFetcher};
