//! Core domain logic for geographic radius search.
//! This crate owns place storage, the geocentric geometry model and the
//! ranked distance query.

pub mod config;
pub mod db;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, CoreConfig, LoggingConfig, SearchConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use geometry::{
    decode_box, decode_point, encode_box, encode_point, to_geo_point, BoundingBox,
    GeometryDecodeError, GeometryEncodeError, GeometryType, GeometryValue, GeoPoint,
    EARTH_RADIUS_METERS,
};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::place::{Place, PlaceId, PlaceValidationError};
pub use repo::place_repo::{
    PlaceListQuery, PlaceRepository, RepoError, RepoResult, SqlitePlaceRepository,
};
pub use search::{
    CancelToken, DistanceQuery, DistanceQueryBuilder, ExecutionControl, MemoryPlaceStore,
    PlaceStore, SearchError, SearchErrorKind, SearchHit, SearchOutcome, SearchResult,
    SqlitePlaceStore,
};
pub use service::geo_search_service::{
    GeoSearchRequest, GeoSearchResponse, GeoSearchResponseItem, GeoSearchService,
    LogFacadeSearchLog, PlaceDto, SearchLog,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
