//! Typed page envelopes
//!
//! Wire-shape structs for search responses, plus the narrow view the cursor
//! logic consumes. The paginator is generic over the document type; domain
//! structs never appear in the pagination core.

use crate::types::JsonValue;
use serde::Deserialize;

/// Narrow view of one page the cursor logic advances on
///
/// Hit count, last sort key, and the rotated point-in-time id are all the
/// paginator reads from a response; everything else is payload passed
/// through to the caller.
pub trait PageEnvelope {
    /// Number of hits on this page
    fn hit_count(&self) -> usize;

    /// Sort values of the last hit, when hits carry them
    fn last_sort_key(&self) -> Option<&[JsonValue]>;

    /// Rotated point-in-time id, when the response carries one
    fn pit_id(&self) -> Option<&str>;
}

/// Search response as returned by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse<T> {
    /// Rotated point-in-time id
    #[serde(default)]
    pub pit_id: Option<String>,
    /// Hit container
    pub hits: HitsContainer<T>,
}

/// The `hits` object of a search response
#[derive(Debug, Clone, Deserialize)]
pub struct HitsContainer<T> {
    /// Total match count as reported by the backend
    #[serde(default)]
    pub total: Option<TotalHits>,
    /// Hits on this page, in cursor order
    // Bare #[serde(default)] would put a `T: Default` bound on the derived impl
    #[serde(default = "Vec::new")]
    pub hits: Vec<Hit<T>>,
}

/// Reported total, e.g. `{"value": 25000, "relation": "eq"}`
#[derive(Debug, Clone, Deserialize)]
pub struct TotalHits {
    /// Number of matching documents
    pub value: i64,
    /// How `value` relates to the true total (`eq`, or `gte` when capped)
    #[serde(default)]
    pub relation: Option<String>,
}

/// One decoded hit
#[derive(Debug, Clone, Deserialize)]
pub struct Hit<T> {
    /// Index the hit came from
    #[serde(rename = "_index")]
    pub index: String,
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Decoded document body
    #[serde(rename = "_source")]
    pub source: T,
    /// Sort values backing the cursor; empty when the search had no sort
    #[serde(default)]
    pub sort: Vec<JsonValue>,
}

impl<T> PageEnvelope for SearchResponse<T> {
    fn hit_count(&self) -> usize {
        self.hits.hits.len()
    }

    fn last_sort_key(&self) -> Option<&[JsonValue]> {
        self.hits
            .hits
            .last()
            .map(|hit| hit.sort.as_slice())
            .filter(|sort| !sort.is_empty())
    }

    fn pit_id(&self) -> Option<&str> {
        self.pit_id.as_deref()
    }
}

/// One page of results handed to the caller
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Hits in cursor order
    pub hits: Vec<Hit<T>>,
    /// Total matching documents, when the backend reports it
    pub total: Option<i64>,
}

impl<T> Page<T> {
    /// Empty terminal page
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            total: None,
        }
    }

    /// Number of hits on this page
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether this page has no hits
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Decoded documents, discarding hit metadata
    pub fn into_sources(self) -> Vec<T> {
        self.hits.into_iter().map(|hit| hit.source).collect()
    }
}

impl<T> From<SearchResponse<T>> for Page<T> {
    fn from(response: SearchResponse<T>) -> Self {
        Self {
            total: response.hits.total.map(|t| t.value),
            hits: response.hits.hits,
        }
    }
}
