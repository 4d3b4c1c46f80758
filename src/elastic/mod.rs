//! Search backend transport
//!
//! Defines the minimal `SearchIndex` capability the paginator consumes, and
//! provides `ElasticClient`, a reqwest-backed implementation for
//! Elasticsearch-compatible clusters with retries and error classification.

mod client;

pub use client::{ElasticClient, ElasticConfig, ElasticConfigBuilder};

use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;

// ============================================================================
// SearchIndex Trait
// ============================================================================

/// Minimal search-index capability consumed by the pagination core
///
/// The paginator never talks to a concrete client; it depends on this trait
/// so tests and alternative backends can stand in for the real cluster.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Execute a search and return the raw response document.
    ///
    /// `index` selects the `/{index}/_search` path. Pass `None` for a
    /// point-in-time search: the request body carries the snapshot binding,
    /// so the path must stay index-free.
    async fn search(&self, index: Option<&str>, body: &JsonValue) -> Result<JsonValue>;

    /// Open a point-in-time against `index` and return its opaque id.
    ///
    /// Fails with `Error::IndexNotFound` when the index does not exist.
    async fn open_pit(&self, index: &str, keep_alive: &str) -> Result<String>;

    /// Close a previously opened point-in-time.
    ///
    /// Closing an already expired id is not an error on real clusters; the
    /// call simply succeeds with nothing freed.
    async fn close_pit(&self, pit_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests;
