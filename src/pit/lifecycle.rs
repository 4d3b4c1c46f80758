//! Point-in-time lifecycle
//!
//! Tracks the one point-in-time a traversal may hold: opened lazily before
//! the first page, refreshed from every response that rotates the id,
//! released when the traversal completes.

use crate::elastic::SearchIndex;
use crate::error::Result;
use crate::query::PitRef;
use tracing::{debug, warn};

/// Manages at most one open point-in-time for a single traversal
///
/// Whether a traversal uses a point-in-time at all is decided once at
/// construction; a disabled lifecycle never touches the network.
#[derive(Debug)]
pub struct PitLifecycle {
    enabled: bool,
    keep_alive: String,
    id: Option<String>,
}

impl PitLifecycle {
    /// Create a lifecycle with the mode fixed for the whole traversal
    pub fn new(enabled: bool, keep_alive: impl Into<String>) -> Self {
        Self {
            enabled,
            keep_alive: keep_alive.into(),
            id: None,
        }
    }

    /// Whether this traversal uses a point-in-time
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The currently held id, if any
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Reference for embedding in a search body, when an id is held
    pub fn pit_ref(&self) -> Option<PitRef> {
        self.id
            .as_ref()
            .map(|id| PitRef::new(id.clone(), self.keep_alive.clone()))
    }

    /// Open the point-in-time if the mode calls for one and none is held
    pub async fn ensure_open(&mut self, client: &dyn SearchIndex, index: &str) -> Result<()> {
        if !self.enabled || self.id.is_some() {
            return Ok(());
        }

        let id = client.open_pit(index, &self.keep_alive).await?;
        debug!("Opened point-in-time on {}", index);
        self.id = Some(id);
        Ok(())
    }

    /// Store the rotated id carried by a page response
    pub fn refresh(&mut self, new_id: impl Into<String>) {
        self.id = Some(new_id.into());
    }

    /// Best-effort close of the held id
    ///
    /// Failures are logged and swallowed; the server reclaims an unclosed
    /// point-in-time when its keep-alive expires.
    pub async fn release(&mut self, client: &dyn SearchIndex) {
        if let Some(id) = self.id.take() {
            match client.close_pit(&id).await {
                Ok(()) => debug!("Closed point-in-time"),
                Err(e) => warn!("Failed to close point-in-time: {}", e),
            }
        }
    }
}
