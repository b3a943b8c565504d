//! Place domain model.
//!
//! # Responsibility
//! - Define the stored place record returned by search.
//! - Validate coordinates before they reach the geometry converter.
//!
//! # Invariants
//! - `id` is stable and never reused for another place.
//! - `latitude` is within `[-90, 90]`, `longitude` within `[-180, 180]`.
//! - `created_at` is the tie-break key for equal search distances.

use crate::geometry::{CoordinateError, GeoPoint};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a place.
pub type PlaceId = Uuid;

/// Stored place record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Inactive places are hidden from default searches.
    pub active: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Place {
    /// Creates an active place with a generated ID and current timestamps.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self::with_id(Uuid::new_v4(), name, latitude, longitude)
    }

    /// Creates an active place with a caller-provided ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: PlaceId, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            name: name.into(),
            address: None,
            latitude,
            longitude,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks persisted invariants.
    pub fn validate(&self) -> Result<(), PlaceValidationError> {
        if self.name.trim().is_empty() {
            return Err(PlaceValidationError::EmptyName);
        }
        self.geo_point()?;
        Ok(())
    }

    /// Geocentric point for this place's coordinates.
    pub fn geo_point(&self) -> Result<GeoPoint, PlaceValidationError> {
        GeoPoint::from_lat_lon(self.latitude, self.longitude)
            .map_err(PlaceValidationError::Coordinate)
    }
}

/// Place invariant violation.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceValidationError {
    EmptyName,
    Coordinate(CoordinateError),
}

impl Display for PlaceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "place name cannot be empty"),
            Self::Coordinate(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlaceValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyName => None,
            Self::Coordinate(err) => Some(err),
        }
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
