// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # deeppage
//!
//! Deep pagination for Elasticsearch-compatible search backends.
//! Retrieves result sets of any size through bounded page requests while
//! preserving a single consistent snapshot.
//!
//! ## Features
//!
//! - **Deep result sets**: walk past the result-window limit with `search_after`
//! - **Consistent snapshots**: lazy point-in-time open, refresh on rotation,
//!   release on completion
//! - **Typed pages**: hits decode straight into your `serde` structs
//! - **Bounded memory**: one page in flight, never the full result set
//! - **Resilient transport**: bounded retries with backoff and Retry-After support
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use deeppage::{BoolFilter, ElasticClient, SearchPaginator};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct CloudResource {
//!     arn: String,
//!     region: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> deeppage::Result<()> {
//!     let client = ElasticClient::from_url("http://localhost:9200")?;
//!
//!     let filters = vec![BoolFilter::term("cloud.provider", "aws")];
//!     let mut paginator = SearchPaginator::<CloudResource>::new(
//!         &client,
//!         "aws_resources",
//!         &filters,
//!         Some(25_000),
//!     )?;
//!
//!     while paginator.has_next() {
//!         let page = paginator.next_page().await?;
//!         for hit in &page.hits {
//!             println!("{} in {}", hit.source.arn, hit.source.region);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SearchPaginator<T>                     │
//! │   has_next()       next_page() → Page<T>        close()     │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//! ┌────────────┬───────────────┼───────────────┬───────────────┐
//! │   Query    │      PIT      │  Pagination   │   Elastic     │
//! ├────────────┼───────────────┼───────────────┼───────────────┤
//! │ BoolFilter │ ensure_open   │ search_after  │ POST _search  │
//! │ Envelope   │ refresh       │ limit gate    │ POST _pit     │
//! │ match_all  │ release       │ short page    │ retry/backoff │
//! └────────────┴───────────────┴───────────────┴───────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Add docs before 1.0 release

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for deeppage
pub mod error;

/// Common types and type aliases
pub mod types;

/// Query composition (filters and the search envelope)
pub mod query;

/// Point-in-time snapshot management
pub mod pit;

/// Cursor pagination over a search index
pub mod pagination;

/// Search backend transport
pub mod elastic;

#[cfg(test)]
mod testutil;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export the types most callers touch
pub use elastic::{ElasticClient, ElasticConfig, SearchIndex};
pub use pagination::{
    Hit, Page, PaginatorConfig, SearchPaginator, DEFAULT_KEEP_ALIVE, DEFAULT_PAGE_SIZE,
};
pub use query::{build_query, BoolFilter, SearchEnvelope, SortClause};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
