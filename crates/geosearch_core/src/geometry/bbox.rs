//! Axis-aligned bounding box ("cube") and its two-point text codec.
//!
//! # Invariants
//! - `corner1` is the component-wise minimum, `corner2` the maximum.
//! - Encoded text always contains exactly two parenthesized point groups.
//! - Decoding ignores any group after the second one.

use super::error::{DecodeReason, GeometryDecodeError, GeometryEncodeError, GeometryType};
use super::point::{check_finite, decode_point, encode_point, GeoPoint};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

static POINT_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((.*?)\)").expect("valid point group regex"));

/// Axis-aligned box in the Cartesian embedding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    corner1: GeoPoint,
    corner2: GeoPoint,
}

impl BoundingBox {
    /// Builds a box spanning two arbitrary corners.
    pub fn new(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            corner1: GeoPoint::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            corner2: GeoPoint::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Cube centered on `center` extending `half_width` along each axis.
    pub fn around(center: &GeoPoint, half_width: f64) -> Self {
        Self::new(
            GeoPoint::new(
                center.x - half_width,
                center.y - half_width,
                center.z - half_width,
            ),
            GeoPoint::new(
                center.x + half_width,
                center.y + half_width,
                center.z + half_width,
            ),
        )
    }

    pub fn corner1(&self) -> GeoPoint {
        self.corner1
    }

    pub fn corner2(&self) -> GeoPoint {
        self.corner2
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.corner1.x..=self.corner2.x).contains(&point.x)
            && (self.corner1.y..=self.corner2.y).contains(&point.y)
            && (self.corner1.z..=self.corner2.z).contains(&point.z)
    }
}

/// Renders `corner1` then `corner2`, joined by a bare comma.
pub fn encode_box(bounds: &BoundingBox) -> Result<String, GeometryEncodeError> {
    check_finite(&bounds.corner1, GeometryType::Cube)?;
    check_finite(&bounds.corner2, GeometryType::Cube)?;
    Ok(format!(
        "{},{}",
        encode_point(&bounds.corner1)?,
        encode_point(&bounds.corner2)?
    ))
}

/// Parses `(x1, y1, z1),(x2, y2, z2)` into a box.
///
/// Only the first two groups are read; trailing groups are ignored.
pub fn decode_box(raw: &str) -> Result<BoundingBox, GeometryDecodeError> {
    let groups: Vec<&str> = POINT_GROUP_RE
        .find_iter(raw)
        .map(|found| found.as_str().trim())
        .filter(|group| !group.is_empty())
        .take(2)
        .collect();

    if groups.len() < 2 {
        return Err(GeometryDecodeError::cube(
            raw,
            DecodeReason::MissingGroups {
                found: groups.len(),
            },
        ));
    }

    let decode_group = |group: &str| {
        decode_point(group)
            .map_err(|err| GeometryDecodeError::cube(raw, DecodeReason::Group(Box::new(err))))
    };
    let first = decode_group(groups[0])?;
    let second = decode_group(groups[1])?;

    Ok(BoundingBox::new(first, second))
}

impl ToSql for BoundingBox {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let text =
            encode_box(self).map_err(|err| rusqlite::Error::ToSqlConversionFailure(err.into()))?;
        Ok(ToSqlOutput::from(text))
    }
}

impl FromSql for BoundingBox {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        decode_box(text).map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_box, encode_box, BoundingBox};
    use crate::geometry::error::{DecodeReason, GeometryDecodeKind, GeometryType};
    use crate::geometry::point::GeoPoint;

    #[test]
    fn new_normalizes_corner_order() {
        let bounds = BoundingBox::new(GeoPoint::new(5.0, -1.0, 3.0), GeoPoint::new(1.0, 2.0, -3.0));
        assert_eq!(bounds.corner1(), GeoPoint::new(1.0, -1.0, -3.0));
        assert_eq!(bounds.corner2(), GeoPoint::new(5.0, 2.0, 3.0));
    }

    #[test]
    fn encode_emits_two_groups_in_corner_order() {
        let bounds = BoundingBox::new(GeoPoint::new(0.0, 0.0, 0.0), GeoPoint::new(1.0, 2.0, 3.0));
        assert_eq!(encode_box(&bounds).unwrap(), "(0, 0, 0),(1, 2, 3)");
    }

    #[test]
    fn decode_sorts_unsorted_producer_text() {
        let bounds = decode_box("(10, 20, 30), (-1, -2, -3)").unwrap();
        assert_eq!(bounds.corner1(), GeoPoint::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.corner2(), GeoPoint::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn single_group_is_box_malformed() {
        let err = decode_box("(1,2,3)").unwrap_err();
        assert_eq!(err.kind, GeometryDecodeKind::BoxMalformed);
        assert_eq!(err.source_type, GeometryType::Cube);
        assert_eq!(err.raw, "(1,2,3)");
        assert_eq!(err.reason, DecodeReason::MissingGroups { found: 1 });
    }

    #[test]
    fn bad_group_is_reported_as_box_malformed_with_point_cause() {
        let err = decode_box("(1,2,3),(4,x,6)").unwrap_err();
        assert_eq!(err.kind, GeometryDecodeKind::BoxMalformed);
        assert_eq!(err.raw, "(1,2,3),(4,x,6)");
        match err.reason {
            DecodeReason::Group(inner) => {
                assert_eq!(inner.kind, GeometryDecodeKind::PointMalformed);
                assert_eq!(inner.raw, "(4,x,6)");
            }
            other => panic!("unexpected reason: {other:?}"),
        }
    }

    #[test]
    fn groups_after_the_second_are_ignored() {
        let bounds = decode_box("(0,0,0),(1,1,1),(garbage)").unwrap();
        assert_eq!(bounds.corner2(), GeoPoint::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn encode_rejects_non_finite_corner() {
        let bounds = BoundingBox::around(&GeoPoint::new(0.0, 0.0, 0.0), f64::INFINITY);
        let err = encode_box(&bounds).unwrap_err();
        assert_eq!(err.target_type, GeometryType::Cube);
        assert_eq!(err.component, "x");
    }

    #[test]
    fn contains_is_inclusive_on_faces() {
        let bounds = BoundingBox::around(&GeoPoint::new(0.0, 0.0, 0.0), 10.0);
        assert!(bounds.contains(&GeoPoint::new(10.0, -10.0, 0.0)));
        assert!(!bounds.contains(&GeoPoint::new(10.0001, 0.0, 0.0)));
    }
}
