//! Resource fetching for referenced payloads.
//!
//! Media and download elements point at encrypted resources by URI; the
//! engine pulls those bytes through the [`ResourceFetcher`] seam. A fetched
//! body stays lazy until [`FetchedBody::into_bytes`] materializes it; the
//! decrypt path owns that conversion, not the fetcher.

use crate::error::{PageError, PageResult};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// A fetched payload, not yet necessarily in memory.
pub struct FetchedBody(BodyKind);

enum BodyKind {
    Bytes(Vec<u8>),
    Http(reqwest::Response),
}

impl FetchedBody {
    /// Wraps bytes that are already in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(BodyKind::Bytes(bytes))
    }

    fn from_response(response: reqwest::Response) -> Self {
        Self(BodyKind::Http(response))
    }

    /// Fully materializes the payload.
    pub async fn into_bytes(self) -> PageResult<Vec<u8>> {
        match self.0 {
            BodyKind::Bytes(bytes) => Ok(bytes),
            BodyKind::Http(response) => Ok(response.bytes().await?.to_vec()),
        }
    }
}

/// Pulls encrypted payload bytes from a source URI.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> PageResult<FetchedBody>;
}

/// Fetcher for `http`/`https` URIs.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, uri: &str) -> PageResult<FetchedBody> {
        let response = self.client.get(uri).send().await?.error_for_status()?;
        Ok(FetchedBody::from_response(response))
    }
}

/// Fetcher that resolves URIs against a local static-site directory.
///
/// Used at authoring time to verify a page tree against the files that will
/// be deployed next to it. Rejects any path that would escape the base
/// directory.
pub struct FsFetcher {
    base: PathBuf,
}

impl FsFetcher {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, uri: &str) -> PageResult<PathBuf> {
        let relative = Path::new(uri.trim_start_matches('/'));
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(PageError::Fetch(format!(
                        "refusing to fetch outside the site root: {uri}"
                    )));
                }
            }
        }
        Ok(self.base.join(relative))
    }
}

#[async_trait]
impl ResourceFetcher for FsFetcher {
    async fn fetch(&self, uri: &str) -> PageResult<FetchedBody> {
        let path = self.resolve(uri)?;
        let bytes = tokio::fs::read(&path).await?;
        Ok(FetchedBody::from_bytes(bytes))
    }
}
