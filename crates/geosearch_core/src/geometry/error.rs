//! Geometry codec and coordinate errors.
//!
//! # Invariants
//! - Decode errors always carry the raw text they failed on.
//! - Decode errors never fall back to a default value.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::ParseFloatError;

/// Stored geometry type tag, matching the textual source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point,
    Cube,
}

impl GeometryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Cube => "cube",
        }
    }
}

/// Malformed-geometry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryDecodeKind {
    PointMalformed,
    BoxMalformed,
}

/// Detail on why a decode failed.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeReason {
    /// Point text did not split into exactly three tokens.
    TokenCount { found: usize },
    InvalidNumber {
        token: String,
        source: ParseFloatError,
    },
    /// Token parsed but is NaN or infinite.
    NonFinite { token: String },
    /// Box text had fewer than two parenthesized groups.
    MissingGroups { found: usize },
    /// A box group failed point decoding.
    Group(Box<GeometryDecodeError>),
}

/// Raw textual geometry failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDecodeError {
    pub kind: GeometryDecodeKind,
    pub raw: String,
    pub source_type: GeometryType,
    pub reason: DecodeReason,
}

impl GeometryDecodeError {
    pub(crate) fn point(raw: &str, reason: DecodeReason) -> Self {
        Self {
            kind: GeometryDecodeKind::PointMalformed,
            raw: raw.to_string(),
            source_type: GeometryType::Point,
            reason,
        }
    }

    pub(crate) fn cube(raw: &str, reason: DecodeReason) -> Self {
        Self {
            kind: GeometryDecodeKind::BoxMalformed,
            raw: raw.to_string(),
            source_type: GeometryType::Cube,
            reason,
        }
    }
}

impl Display for GeometryDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self.kind {
            GeometryDecodeKind::PointMalformed => "malformed point",
            GeometryDecodeKind::BoxMalformed => "malformed box",
        };
        write!(
            f,
            "{label} (type {}) `{}`: ",
            self.source_type.as_str(),
            self.raw
        )?;
        match &self.reason {
            DecodeReason::TokenCount { found } => {
                write!(f, "expected 3 comma-separated values, found {found}")
            }
            DecodeReason::InvalidNumber { token, source } => {
                write!(f, "invalid number `{token}`: {source}")
            }
            DecodeReason::NonFinite { token } => write!(f, "non-finite value `{token}`"),
            DecodeReason::MissingGroups { found } => {
                write!(f, "expected 2 parenthesized points, found {found}")
            }
            DecodeReason::Group(inner) => write!(f, "{inner}"),
        }
    }
}

impl Error for GeometryDecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.reason {
            DecodeReason::InvalidNumber { source, .. } => Some(source),
            DecodeReason::Group(inner) => Some(inner.as_ref()),
            DecodeReason::TokenCount { .. }
            | DecodeReason::NonFinite { .. }
            | DecodeReason::MissingGroups { .. } => None,
        }
    }
}

/// Attempt to encode a geometry value that has no valid textual form.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryEncodeError {
    pub target_type: GeometryType,
    /// Axis name of the offending component (`x`, `y` or `z`).
    pub component: &'static str,
    pub value: f64,
}

impl Display for GeometryEncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cannot encode {} with non-finite {} component: {}",
            self.target_type.as_str(),
            self.component,
            self.value
        )
    }
}

impl Error for GeometryEncodeError {}

/// Latitude/longitude outside the accepted domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateError {
    /// Must be finite and within `[-90, 90]`.
    Latitude(f64),
    /// Must be finite and within `[-180, 180]`.
    Longitude(f64),
}

impl Display for CoordinateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude(value) => write!(f, "latitude {value} is outside [-90, 90]"),
            Self::Longitude(value) => write!(f, "longitude {value} is outside [-180, 180]"),
        }
    }
}

impl Error for CoordinateError {}
