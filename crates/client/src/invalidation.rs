//! Out-of-band cache invalidation.
//!
//! The application posts a [`ControlMessage`] after it mutates data that may
//! be cached. A listener task purges matching API store entries. Nothing is
//! sent back and failures stop at a log line.

use lantern_core::{Error, Store};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Messages accepted on the control channel, e.g. `{"type":"INVALIDATE_CONTENT_CACHE"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    #[serde(rename = "INVALIDATE_CONTENT_CACHE")]
    InvalidateContentCache,
    /// Any other `type`; ignored.
    #[serde(other)]
    Unknown,
}

/// Delete every entry whose URL contains one of `patterns`.
///
/// Returns the number of entries removed. A failed single delete is logged
/// and skipped; a failed enumeration is returned.
pub async fn invalidate_matching(store: &Store, patterns: &[String]) -> Result<usize, Error> {
    let keys = store.keys().await?;
    let mut removed = 0;

    for identity in keys
        .iter()
        .filter(|id| patterns.iter().any(|p| id.url.contains(p.as_str())))
    {
        match store.delete(identity).await {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(error) => tracing::warn!(store = store.name(), %identity, %error, "failed to delete cache entry"),
        }
    }

    Ok(removed)
}

/// Posting side of the control channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ControlSender {
    tx: mpsc::UnboundedSender<ControlMessage>,
}

impl ControlSender {
    /// Fire-and-forget.
    pub fn post(&self, message: ControlMessage) {
        if self.tx.send(message).is_err() {
            tracing::warn!("control channel closed, message dropped");
        }
    }
}

/// Listener that applies control messages to the API store.
pub struct InvalidationChannel {
    api_store: Store,
    patterns: Vec<String>,
}

impl InvalidationChannel {
    pub fn new(api_store: Store, patterns: Vec<String>) -> Self {
        Self { api_store, patterns }
    }

    pub async fn handle(&self, message: ControlMessage) {
        match message {
            ControlMessage::InvalidateContentCache => {
                match invalidate_matching(&self.api_store, &self.patterns).await {
                    Ok(removed) => {
                        tracing::info!(store = self.api_store.name(), removed, "content cache invalidated")
                    }
                    Err(error) => tracing::warn!(store = self.api_store.name(), %error, "content cache invalidation failed"),
                }
            }
            ControlMessage::Unknown => tracing::debug!("ignoring unknown control message"),
        }
    }

    /// Run the listener on its own task until every sender is dropped.
    pub fn spawn(self) -> (ControlSender, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                self.handle(message).await;
            }
            tracing::debug!("control channel closed");
        });
        (ControlSender { tx }, handle)
    }
}
