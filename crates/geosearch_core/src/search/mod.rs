//! Radius search over geocentric place points.
//!
//! # Responsibility
//! - Build store-independent distance queries (box prefilter + exact filter).
//! - Execute them against SQLite or in-process place storage.
//!
//! # Invariants
//! - Results are ranked by distance, then `created_at`, then `place_id`.
//! - A search either returns its full window or fails; never partial hits.

pub mod error;
pub mod hit;
pub mod memory;
pub mod query;
pub mod sqlite;
pub mod store;

pub use error::{QueryBuildError, SearchError, SearchErrorKind, SearchOutcome};
pub use hit::{SearchHit, SearchResult};
pub use memory::MemoryPlaceStore;
pub use query::{
    Candidate, DistanceQuery, DistanceQueryBuilder, OrderBy, Pagination, Predicate, SortKey,
    SortOrder,
};
pub use sqlite::{render_distance_query, SqlStatement, SqlitePlaceStore};
pub use store::{CancelToken, ExecutionControl, PlaceStore};
