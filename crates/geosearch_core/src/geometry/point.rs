//! Geocentric sphere point and its `(x, y, z)` text codec.
//!
//! # Responsibility
//! - Convert latitude/longitude into Cartesian coordinates on a fixed sphere.
//! - Encode/decode points in the stored `(x, y, z)` format.
//!
//! # Invariants
//! - `x² + y² + z² ≈ EARTH_RADIUS_METERS²` for converted points.
//! - `decode_point(&encode_point(p)?)? == p` bit-for-bit for finite `p`.
//! - Out-of-range coordinates are rejected, never clamped.

use super::error::{
    CoordinateError, DecodeReason, GeometryDecodeError, GeometryEncodeError, GeometryType,
};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// Assumed sphere radius in meters, shared by every geometry computation.
pub const EARTH_RADIUS_METERS: f64 = 6_378_168.0;

/// Point on the sphere in geocentric Cartesian coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GeoPoint {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Converts degrees latitude/longitude into a sphere point.
    ///
    /// # Errors
    /// - `CoordinateError::Latitude` when latitude is non-finite or outside `[-90, 90]`.
    /// - `CoordinateError::Longitude` when longitude is non-finite or outside `[-180, 180]`.
    pub fn from_lat_lon(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }

        let lat = latitude.to_radians();
        let lon = longitude.to_radians();
        Ok(Self {
            x: EARTH_RADIUS_METERS * lat.cos() * lon.cos(),
            y: EARTH_RADIUS_METERS * lat.cos() * lon.sin(),
            z: EARTH_RADIUS_METERS * lat.sin(),
        })
    }

    /// Latitude in degrees of the direction this point lies in.
    pub fn latitude(&self) -> f64 {
        let norm = self.norm();
        if norm == 0.0 {
            return 0.0;
        }
        (self.z / norm).clamp(-1.0, 1.0).asin().to_degrees()
    }

    /// Longitude in degrees of the direction this point lies in.
    pub fn longitude(&self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Straight-line (secant) distance in meters.
    pub fn chord_distance(&self, other: &GeoPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Great-circle distance in meters derived from the chord length.
    pub fn great_circle_distance(&self, other: &GeoPoint) -> f64 {
        let half_chord = self.chord_distance(other) / (2.0 * EARTH_RADIUS_METERS);
        2.0 * EARTH_RADIUS_METERS * half_chord.min(1.0).asin()
    }
}

/// Converts degrees latitude/longitude into a sphere point.
///
/// Alias of [`GeoPoint::from_lat_lon`].
pub fn to_geo_point(latitude: f64, longitude: f64) -> Result<GeoPoint, CoordinateError> {
    GeoPoint::from_lat_lon(latitude, longitude)
}

/// Renders a point as `(x, y, z)` with round-trip precision.
pub fn encode_point(point: &GeoPoint) -> Result<String, GeometryEncodeError> {
    check_finite(point, GeometryType::Point)?;
    Ok(format!("({}, {}, {})", point.x, point.y, point.z))
}

pub(crate) fn check_finite(
    point: &GeoPoint,
    target_type: GeometryType,
) -> Result<(), GeometryEncodeError> {
    for (component, value) in [("x", point.x), ("y", point.y), ("z", point.z)] {
        if !value.is_finite() {
            return Err(GeometryEncodeError {
                target_type,
                component,
                value,
            });
        }
    }
    Ok(())
}

/// Parses `(x, y, z)` text into a point.
///
/// One enclosing parenthesis pair is optional; whitespace around tokens is ignored.
pub fn decode_point(raw: &str) -> Result<GeoPoint, GeometryDecodeError> {
    let body = strip_parens(raw.trim());
    let tokens: Vec<&str> = body.split(',').map(str::trim).collect();
    if tokens.len() != 3 {
        return Err(GeometryDecodeError::point(
            raw,
            DecodeReason::TokenCount {
                found: tokens.len(),
            },
        ));
    }

    let mut values = [0.0_f64; 3];
    for (slot, token) in values.iter_mut().zip(&tokens) {
        let value = token.parse::<f64>().map_err(|source| {
            GeometryDecodeError::point(
                raw,
                DecodeReason::InvalidNumber {
                    token: (*token).to_string(),
                    source,
                },
            )
        })?;
        if !value.is_finite() {
            return Err(GeometryDecodeError::point(
                raw,
                DecodeReason::NonFinite {
                    token: (*token).to_string(),
                },
            ));
        }
        *slot = value;
    }

    Ok(GeoPoint::new(values[0], values[1], values[2]))
}

fn strip_parens(text: &str) -> &str {
    text.strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(text)
}

impl ToSql for GeoPoint {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let text =
            encode_point(self).map_err(|err| rusqlite::Error::ToSqlConversionFailure(err.into()))?;
        Ok(ToSqlOutput::from(text))
    }
}

impl FromSql for GeoPoint {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        decode_point(text).map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}
