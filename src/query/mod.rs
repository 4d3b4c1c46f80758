//! Query composition module
//!
//! Builds the request body sent to the search engine.
//!
//! # Overview
//!
//! The query module provides:
//! - `BoolFilter` - typed `term`/`terms` filter values
//! - `build_query` - composes filters into a conjunctive bool query (or match_all)
//! - `SearchEnvelope` - the per-page request body (size, query, pit, sort, search_after)

mod envelope;
mod filter;

pub use envelope::{build_query, PitRef, SearchEnvelope, SortClause, SHARD_DOC_FIELD};
pub use filter::BoolFilter;
