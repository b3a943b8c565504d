//! Sphere geometry and its stored text formats.
//!
//! # Responsibility
//! - Convert latitude/longitude into geocentric Cartesian points.
//! - Own the bit-exact `point` and `cube` text codecs used at the store boundary.
//!
//! # Invariants
//! - Codecs are pure and allocation-only; no I/O, no shared state.
//! - Every decode failure carries the raw text and its source type tag.

pub mod bbox;
pub mod error;
pub mod point;

pub use bbox::{decode_box, encode_box, BoundingBox};
pub use error::{
    CoordinateError, DecodeReason, GeometryDecodeError, GeometryDecodeKind, GeometryEncodeError,
    GeometryType,
};
pub use point::{decode_point, encode_point, to_geo_point, GeoPoint, EARTH_RADIUS_METERS};

/// Geometry value as it crosses the store boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryValue {
    Point(GeoPoint),
    Box(BoundingBox),
}

impl GeometryValue {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Self::Point(_) => GeometryType::Point,
            Self::Box(_) => GeometryType::Cube,
        }
    }

    pub fn encode(&self) -> Result<String, GeometryEncodeError> {
        match self {
            Self::Point(point) => encode_point(point),
            Self::Box(bounds) => encode_box(bounds),
        }
    }

    /// Decodes `raw` as the given stored type.
    pub fn decode(raw: &str, geometry_type: GeometryType) -> Result<Self, GeometryDecodeError> {
        match geometry_type {
            GeometryType::Point => decode_point(raw).map(Self::Point),
            GeometryType::Cube => decode_box(raw).map(Self::Box),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, GeoPoint, GeometryType, GeometryValue};

    #[test]
    fn tagged_value_dispatches_on_type() {
        let point = GeoPoint::from_lat_lon(48.85, 2.35).unwrap();
        let bounds = BoundingBox::around(&point, 2_500.0);

        for value in [GeometryValue::Point(point), GeometryValue::Box(bounds)] {
            let text = value.encode().unwrap();
            let decoded = GeometryValue::decode(&text, value.geometry_type()).unwrap();
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn box_text_is_not_a_point() {
        let text = GeometryValue::Box(BoundingBox::around(&GeoPoint::new(0.0, 0.0, 0.0), 1.0))
            .encode()
            .unwrap();
        assert!(GeometryValue::decode(&text, GeometryType::Point).is_err());
    }
}
