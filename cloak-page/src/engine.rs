//! Element reveal orchestrator.
//!
//! Discovers every marked element under a root, classifies each by its
//! structural role, decrypts its payload and substitutes the result back in
//! a role-appropriate way. Elements are processed as independent concurrent
//! tasks; content revealed along the way is re-scanned so secrets nested
//! inside secrets are picked up mid-flight. One completion signal fires
//! exactly once, after every element ever added to the batch has finished.
//!
//! Per-element failures (unreachable resource, wrong passphrase, malformed
//! payload) are logged and counted as processed — they never propagate to
//! the caller and never hold up the rest of the page.

use crate::blob::BlobStore;
use crate::dom::{Dom, NodeId};
use crate::error::{PageError, PageResult};
use crate::fetch::ResourceFetcher;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot, Mutex as TokioMutex};
use tracing::{debug, warn};

/// Attribute marking an element as holding a secret; its value is the
/// encoded parameter string for that element's payload.
pub const MARKER_ATTR: &str = "data-secret";

/// Attribute added to an element once its secret has been revealed.
pub const WITNESS_ATTR: &str = "data-secret-decrypted";

/// Event dispatched on the root when the whole batch has been processed.
pub const COMPLETION_EVENT: &str = "decrypted";

/// A page tree shared between the engine's concurrent element tasks.
pub type SharedDom = Arc<TokioMutex<dyn Dom>>;

/// Engine settings.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Marker attribute to scan for.
    pub marker_attr: String,
    /// Completion-witness attribute added after a successful reveal.
    pub witness_attr: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            marker_attr: MARKER_ATTR.to_string(),
            witness_attr: WITNESS_ATTR.to_string(),
        }
    }
}

/// Progress events for embedders that want more than the log sink.
#[derive(Clone, Debug)]
pub enum RevealEvent {
    /// An element's secret was revealed and substituted.
    ElementRevealed { node: NodeId },
    /// An element failed and was left untouched.
    ElementFailed { node: NodeId, error: String },
    /// Every discovered element has been processed.
    BatchCompleted { revealed: usize, failed: usize },
}

/// How a marked element stores and receives its secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementRole {
    /// Embedded media whose `src` points at an encrypted resource.
    MediaSource,
    /// Download link whose `href` points at an encrypted resource.
    DownloadLink,
    /// Element whose own text content is the base64 ciphertext.
    InlineContent,
}

/// Decides, once per element, where its ciphertext lives and how the
/// decrypted result is re-attached.
pub fn classify(dom: &dyn Dom, node: NodeId) -> ElementRole {
    match dom.tag(node) {
        Some("img" | "audio" | "video" | "iframe") => ElementRole::MediaSource,
        Some("script") if dom.attr(node, "src").is_some() => ElementRole::MediaSource,
        Some("a") if dom.attr(node, "download").is_some() => ElementRole::DownloadLink,
        _ => ElementRole::InlineContent,
    }
}

/// Shared progress of one reveal batch.
///
/// `discovered` is live: inline reveals append to it mid-flight. Appends and
/// completion ticks run under the same lock, so a tick always compares
/// against the length as of that moment.
struct BatchState {
    discovered: Vec<NodeId>,
    processed: usize,
    revealed: usize,
    failed: usize,
    done: Option<oneshot::Sender<()>>,
}

fn lock(batch: &Mutex<BatchState>) -> MutexGuard<'_, BatchState> {
    batch.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The reveal orchestrator.
#[derive(Clone)]
pub struct RevealEngine {
    config: Arc<EngineConfig>,
    fetcher: Arc<dyn ResourceFetcher>,
    blobs: Arc<BlobStore>,
    events: Option<mpsc::Sender<RevealEvent>>,
}

impl RevealEngine {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            config: Arc::new(EngineConfig::default()),
            fetcher,
            blobs: Arc::new(BlobStore::new()),
            events: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Streams [`RevealEvent`]s to the given channel.
    ///
    /// Drain the channel concurrently with the batch (or size it for the
    /// page); element tasks await a slot when it is full.
    pub fn with_events(mut self, events: mpsc::Sender<RevealEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// The registry holding decrypted media/download payloads.
    pub fn blobs(&self) -> Arc<BlobStore> {
        self.blobs.clone()
    }

    /// Reveals every marked element in the whole document.
    pub async fn decrypt_page(&self, dom: &SharedDom, password: &str) {
        let root = dom.lock().await.root();
        self.decrypt_elements(dom, root, password).await;
    }

    /// Reveals every marked element under `root`, including elements
    /// uncovered by recursive reveal.
    ///
    /// Resolves once all of them have been processed (success or failure)
    /// and dispatches a single [`COMPLETION_EVENT`] on `root` at the same
    /// moment. Individual failures are visible only through the log sink,
    /// the event stream, and the absence of the witness attribute.
    pub async fn decrypt_elements(&self, dom: &SharedDom, root: NodeId, password: &str) {
        let initial = dom.lock().await.marked_below(root, &self.config.marker_attr);
        debug!("collected {} marked elements", initial.len());

        if initial.is_empty() {
            dom.lock().await.dispatch(root, COMPLETION_EVENT);
            self.emit(RevealEvent::BatchCompleted {
                revealed: 0,
                failed: 0,
            })
            .await;
            return;
        }

        let (done_tx, mut done_rx) = oneshot::channel();
        let (work_tx, mut work_rx) = mpsc::unbounded_channel();
        let batch = Arc::new(Mutex::new(BatchState {
            discovered: initial.clone(),
            processed: 0,
            revealed: 0,
            failed: 0,
            done: Some(done_tx),
        }));

        for node in initial {
            self.spawn_worker(dom.clone(), batch.clone(), work_tx.clone(), node, password);
        }

        loop {
            tokio::select! {
                _ = &mut done_rx => break,
                Some(node) = work_rx.recv() => {
                    self.spawn_worker(dom.clone(), batch.clone(), work_tx.clone(), node, password);
                }
            }
        }

        let (revealed, failed) = {
            let state = lock(&batch);
            (state.revealed, state.failed)
        };
        debug!("batch complete: {revealed} revealed, {failed} failed");
        dom.lock().await.dispatch(root, COMPLETION_EVENT);
        self.emit(RevealEvent::BatchCompleted { revealed, failed })
            .await;
    }

    fn spawn_worker(
        &self,
        dom: SharedDom,
        batch: Arc<Mutex<BatchState>>,
        work_tx: mpsc::UnboundedSender<NodeId>,
        node: NodeId,
        password: &str,
    ) {
        let engine = self.clone();
        let password = password.to_string();
        tokio::spawn(async move {
            let result = engine
                .reveal_one(&dom, &batch, &work_tx, node, &password)
                .await;
            engine.finish(node, result, &batch).await;
        });
    }

    /// Processes one element. Errors surface to [`Self::finish`], nowhere
    /// else.
    async fn reveal_one(
        &self,
        dom: &SharedDom,
        batch: &Arc<Mutex<BatchState>>,
        work_tx: &mpsc::UnboundedSender<NodeId>,
        node: NodeId,
        password: &str,
    ) -> PageResult<ElementRole> {
        let (role, params) = {
            let dom = dom.lock().await;
            let params = dom
                .attr(node, &self.config.marker_attr)
                .ok_or(PageError::MissingMarker)?;
            (classify(&*dom, node), params)
        };

        match role {
            ElementRole::MediaSource | ElementRole::DownloadLink => {
                let attr = match role {
                    ElementRole::MediaSource => "src",
                    _ => "href",
                };
                let uri = dom
                    .lock()
                    .await
                    .attr(node, attr)
                    .ok_or(PageError::MissingSource)?;
                let body = self.fetcher.fetch(&uri).await?;
                let ciphertext = body.into_bytes().await?;
                let plaintext = cloak_crypto::decrypt(&ciphertext, password, params.as_str())?;

                let blob_uri = self.blobs.publish(plaintext);
                let mut dom = dom.lock().await;
                dom.set_attr(node, attr, &blob_uri);
                dom.set_attr(node, &self.config.witness_attr, "");
            }
            ElementRole::InlineContent => {
                let text = dom.lock().await.inner_text(node).unwrap_or_default();
                let ciphertext = STANDARD.decode(text.trim())?;
                let plaintext = cloak_crypto::decrypt(&ciphertext, password, params.as_str())?;
                let markup = String::from_utf8(plaintext)?;

                let fresh = {
                    let mut dom = dom.lock().await;
                    dom.set_content(node, &markup);
                    dom.set_attr(node, &self.config.witness_attr, "");
                    dom.marked_below(node, &self.config.marker_attr)
                };

                if !fresh.is_empty() {
                    // Append before this element's own tick so the batch
                    // length already covers the new elements when the
                    // completion check runs.
                    let appended = {
                        let mut state = lock(batch);
                        let appended: Vec<NodeId> = fresh
                            .into_iter()
                            .filter(|id| !state.discovered.contains(id))
                            .collect();
                        state.discovered.extend(appended.iter().copied());
                        appended
                    };
                    debug!("revealed content added {} nested elements", appended.len());
                    for id in appended {
                        // The dispatcher outlives this send: the batch cannot
                        // resolve before this element's own pending tick.
                        let _ = work_tx.send(id);
                    }
                }
            }
        }

        Ok(role)
    }

    async fn finish(
        &self,
        node: NodeId,
        result: PageResult<ElementRole>,
        batch: &Arc<Mutex<BatchState>>,
    ) {
        let succeeded = result.is_ok();
        match result {
            Ok(role) => {
                debug!("revealed {role:?} element {node:?}");
                self.emit(RevealEvent::ElementRevealed { node }).await;
            }
            Err(error) => {
                warn!("element {node:?} left untouched: {error}");
                self.emit(RevealEvent::ElementFailed {
                    node,
                    error: error.to_string(),
                })
                .await;
            }
        }

        let done = {
            let mut state = lock(batch);
            if succeeded {
                state.revealed += 1;
            } else {
                state.failed += 1;
            }
            state.processed += 1;
            // Compare against the length now, not the length at batch
            // start: the sequence may have grown since.
            if state.processed == state.discovered.len() {
                state.done.take()
            } else {
                None
            }
        };
        if let Some(done) = done {
            let _ = done.send(());
        }
    }

    async fn emit(&self, event: RevealEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event).await;
        }
    }
}
