//! Point-in-time snapshot management
//!
//! A point-in-time pins a consistent view of an index so `search_after`
//! pagination reads one snapshot while documents keep changing underneath.
//!
//! # Overview
//!
//! - `PitLifecycle` owns the single id a traversal may hold
//! - Opened lazily before the first page, refreshed when the backend rotates
//!   the id, released best-effort when the traversal finishes

mod lifecycle;

pub use lifecycle::PitLifecycle;
