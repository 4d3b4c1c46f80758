//! Cursor paginator
//!
//! Walks a filtered query through a search index one page at a time using
//! `search_after`, under a point-in-time snapshot whenever the traversal may
//! exceed a single page. Tracks returned hits against the caller's limit and
//! releases the snapshot when the traversal finishes.

use crate::elastic::SearchIndex;
use crate::error::{Error, Result};
use crate::pit::PitLifecycle;
use crate::query::{build_query, BoolFilter, SearchEnvelope, SortClause};
use crate::types::JsonValue;
use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::pin::Pin;
use tracing::debug;

use super::page::{Hit, Page, PageEnvelope, SearchResponse};

/// Result-window ceiling most clusters enforce; also the default page size
pub const DEFAULT_PAGE_SIZE: i64 = 10_000;

/// Default keep-alive requested for point-in-times
pub const DEFAULT_KEEP_ALIVE: &str = "1m";

/// Type alias for the page stream returned by `into_stream`
pub type PageStream<'a, T> = Pin<Box<dyn Stream<Item = Result<Page<T>>> + Send + 'a>>;

/// Construction-time tuning for a paginator
#[derive(Debug, Clone)]
pub struct PaginatorConfig {
    /// Hits requested per page
    pub page_size: i64,
    /// Keep-alive for the point-in-time, when one is used
    pub keep_alive: String,
    /// Caller-supplied sort criteria
    pub sort: Vec<SortClause>,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            keep_alive: DEFAULT_KEEP_ALIVE.to_string(),
            sort: Vec::new(),
        }
    }
}

impl PaginatorConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the point-in-time keep-alive
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = keep_alive.into();
        self
    }

    /// Set caller sort criteria
    ///
    /// Under a point-in-time the `_shard_doc` tiebreaker is appended after
    /// these, keeping the cursor order total.
    #[must_use]
    pub fn with_sort(mut self, sort: Vec<SortClause>) -> Self {
        self.sort = sort;
        self
    }
}

/// Streams every match for a filtered query, one bounded page at a time
///
/// One paginator owns one traversal. Whether it runs under a point-in-time
/// is fixed at construction: a snapshot is taken iff the effective limit
/// (`i64::MAX` when unbounded) is at least one page, i.e. whenever the
/// traversal could outrun the backend's result window.
///
/// The traversal is Active until one of three signals flips it to Done:
/// the cumulative hit count passes the limit, a page comes back empty, or a
/// page comes back short. `next_page` on a Done paginator is a caller error
/// (`Error::Exhausted`); transport failures leave the paginator Active and
/// unchanged, so the failed call can simply be retried.
pub struct SearchPaginator<'a, T> {
    client: &'a dyn SearchIndex,
    index: String,
    query: JsonValue,
    page_size: i64,
    limit: i64,
    sort: Vec<SortClause>,
    pit: PitLifecycle,
    queried: i64,
    search_after: Option<Vec<JsonValue>>,
    done: bool,
    _source: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> SearchPaginator<'a, T> {
    /// Create a paginator with default tuning
    ///
    /// `limit` of `None` means unbounded; a negative limit is rejected
    /// before any network call.
    pub fn new(
        client: &'a dyn SearchIndex,
        index: impl Into<String>,
        filters: &[BoolFilter],
        limit: Option<i64>,
    ) -> Result<Self> {
        Self::with_config(client, index, filters, limit, PaginatorConfig::default())
    }

    /// Create a paginator with explicit tuning
    pub fn with_config(
        client: &'a dyn SearchIndex,
        index: impl Into<String>,
        filters: &[BoolFilter],
        limit: Option<i64>,
        config: PaginatorConfig,
    ) -> Result<Self> {
        if let Some(limit) = limit {
            if limit < 0 {
                return Err(Error::invalid_limit(limit));
            }
        }
        if config.page_size <= 0 {
            return Err(Error::config(format!(
                "page size must be positive, got {}",
                config.page_size
            )));
        }

        let limit = limit.unwrap_or(i64::MAX);
        let use_pit = limit >= config.page_size;

        Ok(Self {
            client,
            index: index.into(),
            query: build_query(filters),
            page_size: config.page_size,
            limit,
            sort: config.sort,
            pit: PitLifecycle::new(use_pit, config.keep_alive),
            queried: 0,
            search_after: None,
            done: false,
            _source: PhantomData,
        })
    }

    /// Whether another `next_page` call may yield results
    pub fn has_next(&self) -> bool {
        !self.done
    }

    /// Hits returned so far across all pages
    pub fn queried(&self) -> i64 {
        self.queried
    }

    /// Fetch the next page
    ///
    /// A missing index is not an error: the page comes back empty and the
    /// traversal is Done. Transport and decode failures are surfaced with
    /// the paginator unchanged; `next_page` after Done is `Error::Exhausted`.
    pub async fn next_page(&mut self) -> Result<Page<T>> {
        if self.done {
            return Err(Error::Exhausted);
        }

        if let Err(e) = self.pit.ensure_open(self.client, &self.index).await {
            if e.is_index_not_found() {
                debug!("Index {} does not exist, returning empty result", self.index);
                self.done = true;
                return Ok(Page::empty());
            }
            // No snapshot means no coherent traversal; leave the paginator Done
            self.done = true;
            return Err(e);
        }

        let body = serde_json::to_value(self.envelope())?;

        // A point-in-time search is not addressed to an index path; the
        // body's pit clause selects the snapshot instead
        let target = if self.pit.id().is_some() {
            None
        } else {
            Some(self.index.as_str())
        };

        let raw = match self.client.search(target, &body).await {
            Ok(raw) => raw,
            Err(e) if e.is_index_not_found() => {
                debug!("Index {} does not exist, returning empty result", self.index);
                self.done = true;
                self.pit.release(self.client).await;
                return Ok(Page::empty());
            }
            Err(e) => return Err(e),
        };

        let response: SearchResponse<T> =
            serde_json::from_value(raw).map_err(|e| Error::decode(e.to_string()))?;

        let hits = response.hit_count() as i64;
        self.queried += hits;
        debug!(
            "Fetched page from {}: {} hits, {} so far",
            self.index, hits, self.queried
        );

        if hits > 0 {
            if let Some(sort_key) = response.last_sort_key() {
                self.search_after = Some(sort_key.to_vec());
            }
            if let Some(id) = response.pit_id() {
                self.pit.refresh(id);
            }
        }

        if self.queried > self.limit || hits == 0 || hits < self.page_size {
            self.done = true;
            debug!(
                "Traversal of {} complete: {} hits total",
                self.index, self.queried
            );
            self.pit.release(self.client).await;
        }

        Ok(response.into())
    }

    /// Stop the traversal early and release the snapshot
    ///
    /// Safe to call at any point; a paginator abandoned without `close` falls
    /// back to the point-in-time's keep-alive expiry.
    pub async fn close(&mut self) {
        self.pit.release(self.client).await;
        self.done = true;
    }

    /// Convert into a stream of pages, ending after the final page
    pub fn into_stream(self) -> PageStream<'a, T>
    where
        T: Send + 'a,
    {
        Box::pin(stream::try_unfold(self, |mut paginator| async move {
            if !paginator.has_next() {
                return Ok(None);
            }
            let page = paginator.next_page().await?;
            Ok(Some((page, paginator)))
        }))
    }

    /// Drain every remaining page into a single hit list
    pub async fn collect(mut self) -> Result<Vec<Hit<T>>> {
        let mut all = Vec::new();
        while self.has_next() {
            let page = self.next_page().await?;
            all.extend(page.hits);
        }
        Ok(all)
    }

    /// Assemble the request body for the next page
    fn envelope(&self) -> SearchEnvelope {
        let mut envelope = SearchEnvelope::new(self.page_size, self.query.clone());

        if let Some(pit) = self.pit.pit_ref() {
            let mut sort = self.sort.clone();
            sort.push(SortClause::shard_doc());
            envelope = envelope.with_pit(pit).with_sort(sort);
        } else if !self.sort.is_empty() {
            envelope = envelope.with_sort(self.sort.clone());
        }

        if let Some(after) = &self.search_after {
            envelope = envelope.with_search_after(after.clone());
        }

        envelope
    }
}

impl<T> std::fmt::Debug for SearchPaginator<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPaginator")
            .field("index", &self.index)
            .field("page_size", &self.page_size)
            .field("limit", &self.limit)
            .field("queried", &self.queried)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
