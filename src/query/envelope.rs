//! Search envelope builder
//!
//! Assembles the request body for a search call: size, query, and the
//! optional point-in-time, sort, and cursor clauses. Optional clauses are
//! omitted entirely when absent so the wire shape stays minimal.

use crate::types::{JsonValue, SortOrder};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::json;

use super::filter::BoolFilter;

/// Tiebreaker pseudo-field available under an open point-in-time
pub const SHARD_DOC_FIELD: &str = "_shard_doc";

/// Reference to an open point-in-time, embedded in a search body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PitRef {
    /// Opaque point-in-time id returned by the engine
    pub id: String,
    /// TTL extension applied on each search that carries this reference
    pub keep_alive: String,
}

impl PitRef {
    pub fn new(id: impl Into<String>, keep_alive: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            keep_alive: keep_alive.into(),
        }
    }
}

/// A single sort criterion, serialized as `{"<field>": "<order>"}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    /// Field to sort on
    pub field: String,
    /// Sort direction
    pub order: SortOrder,
}

impl SortClause {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Ascending sort on `field`
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    /// Descending sort on `field`
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }

    /// The descending shard-doc tiebreaker used for point-in-time pagination
    pub fn shard_doc() -> Self {
        Self::desc(SHARD_DOC_FIELD)
    }
}

impl Serialize for SortClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.order)?;
        map.end()
    }
}

/// Complete search request body
///
/// `size` and `query` are always present. The optional clauses are only
/// serialized when set:
/// - `pit` binds the search to an open point-in-time
/// - `sort` fixes a total document order
/// - `search_after` resumes after the last hit of the previous page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEnvelope {
    /// Page size requested from the engine
    pub size: i64,
    /// Query clause, e.g. a bool filter or `match_all`
    pub query: JsonValue,
    /// Point-in-time reference, when paginating against a snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pit: Option<PitRef>,
    /// Sort criteria defining the cursor order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortClause>>,
    /// Sort values of the last hit already consumed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_after: Option<Vec<JsonValue>>,
}

impl SearchEnvelope {
    /// Create a minimal envelope with just size and query
    pub fn new(size: i64, query: JsonValue) -> Self {
        Self {
            size,
            query,
            pit: None,
            sort: None,
            search_after: None,
        }
    }

    /// Bind the envelope to an open point-in-time
    #[must_use]
    pub fn with_pit(mut self, pit: PitRef) -> Self {
        self.pit = Some(pit);
        self
    }

    /// Set the sort criteria
    #[must_use]
    pub fn with_sort(mut self, sort: Vec<SortClause>) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Resume after the given sort values
    #[must_use]
    pub fn with_search_after(mut self, values: Vec<JsonValue>) -> Self {
        self.search_after = Some(values);
        self
    }
}

/// Build the query clause from a set of conjunctive filters
///
/// With no filters this is `{"match_all": {}}`; otherwise every filter lands
/// in a single `bool.filter` array (all must match, none contribute to
/// scoring).
pub fn build_query(filters: &[BoolFilter]) -> JsonValue {
    if filters.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({ "bool": { "filter": filters } })
    }
}
