//! Search-layer error taxonomy.

use crate::db::DbError;
use crate::geometry::{CoordinateError, GeometryDecodeError, GeometryEncodeError};
use crate::repo::place_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Result type for search APIs.
pub type SearchOutcome<T> = Result<T, SearchError>;

/// Request could not be turned into a distance query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryBuildError {
    Coordinate(CoordinateError),
    /// Radius must be finite and non-negative.
    Radius(f64),
}

impl Display for QueryBuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coordinate(err) => write!(f, "invalid search center: {err}"),
            Self::Radius(value) => write!(f, "invalid search radius: {value}"),
        }
    }
}

impl Error for QueryBuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Coordinate(err) => Some(err),
            Self::Radius(_) => None,
        }
    }
}

impl From<CoordinateError> for QueryBuildError {
    fn from(value: CoordinateError) -> Self {
        Self::Coordinate(value)
    }
}

/// Closed set of failure categories callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorKind {
    InvalidRequest,
    GeometryEncode,
    GeometryDecode,
    QueryExecution,
    Cancelled,
    Timeout,
    InvalidData,
}

/// Search failure; no partial results accompany it.
#[derive(Debug)]
pub enum SearchError {
    InvalidRequest(QueryBuildError),
    Encode(GeometryEncodeError),
    Decode(GeometryDecodeError),
    /// Store rejected or failed to execute the query.
    QueryExecution(DbError),
    Cancelled,
    Timeout {
        limit: Duration,
    },
    /// Returned row violates persisted invariants.
    InvalidData(String),
}

impl SearchError {
    pub fn kind(&self) -> SearchErrorKind {
        match self {
            Self::InvalidRequest(_) => SearchErrorKind::InvalidRequest,
            Self::Encode(_) => SearchErrorKind::GeometryEncode,
            Self::Decode(_) => SearchErrorKind::GeometryDecode,
            Self::QueryExecution(_) => SearchErrorKind::QueryExecution,
            Self::Cancelled => SearchErrorKind::Cancelled,
            Self::Timeout { .. } => SearchErrorKind::Timeout,
            Self::InvalidData(_) => SearchErrorKind::InvalidData,
        }
    }
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "{err}"),
            Self::QueryExecution(err) => write!(f, "search query failed: {err}"),
            Self::Cancelled => write!(f, "search cancelled"),
            Self::Timeout { limit } => {
                write!(f, "search exceeded its {} ms deadline", limit.as_millis())
            }
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRequest(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::QueryExecution(err) => Some(err),
            Self::Cancelled | Self::Timeout { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<QueryBuildError> for SearchError {
    fn from(value: QueryBuildError) -> Self {
        Self::InvalidRequest(value)
    }
}

impl From<GeometryEncodeError> for SearchError {
    fn from(value: GeometryEncodeError) -> Self {
        Self::Encode(value)
    }
}

impl From<GeometryDecodeError> for SearchError {
    fn from(value: GeometryDecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::QueryExecution(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::QueryExecution(DbError::Sqlite(value))
    }
}

impl From<RepoError> for SearchError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) => Self::QueryExecution(err),
            other => Self::InvalidData(other.to_string()),
        }
    }
}
