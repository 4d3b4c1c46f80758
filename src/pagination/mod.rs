//! Cursor pagination over a search index
//!
//! Retrieves result sets of any size through bounded page requests,
//! holding memory to one page at a time.
//!
//! # Overview
//!
//! - `SearchPaginator` - drives a limit-bounded `search_after` traversal
//! - `Page` / `Hit` - typed results handed to callers
//! - `PaginatorConfig` - construction-time tuning (page size, keep-alive, sort)
//! - `PageEnvelope` - the narrow response view the cursor logic advances on

mod cursor;
mod page;

pub use cursor::{
    PageStream, PaginatorConfig, SearchPaginator, DEFAULT_KEEP_ALIVE, DEFAULT_PAGE_SIZE,
};
pub use page::{Hit, HitsContainer, Page, PageEnvelope, SearchResponse, TotalHits};
