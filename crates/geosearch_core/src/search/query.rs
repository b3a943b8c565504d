//! Radius search query construction.
//!
//! # Responsibility
//! - Turn a center + radius into a store-independent query descriptor.
//! - Let any store evaluate that descriptor (predicate, ordering, window).
//!
//! # Invariants
//! - The box containment clause admits a superset of the exact distance clause.
//! - Both clauses are always present; the box exists for index pruning only.
//! - Ordering is `distance ASC, created_at ASC, place_id ASC`, so equal
//!   distances still rank deterministically.

use super::error::QueryBuildError;
use super::hit::SearchHit;
use crate::geometry::{BoundingBox, GeoPoint};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Distance,
    CreatedAt,
    PlaceId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub key: SortKey,
    pub order: SortOrder,
}

impl OrderBy {
    pub const fn asc(key: SortKey) -> Self {
        Self {
            key,
            order: SortOrder::Asc,
        }
    }

    pub fn compare(&self, a: &SearchHit, b: &SearchHit) -> Ordering {
        let ordering = match self.key {
            SortKey::Distance => a.distance.total_cmp(&b.distance),
            SortKey::CreatedAt => a.place.created_at.cmp(&b.place.created_at),
            SortKey::PlaceId => a.place.id.cmp(&b.place.id),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Limit/offset window applied after ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Keeps ranks `[offset, offset + limit)` of already-ordered items.
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// Store-side view of one row, enough to evaluate a predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub earth: GeoPoint,
    pub active: bool,
}

/// Filter tree over place rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    ActiveIs(bool),
    /// Exact great-circle distance from `center` is at most `radius_m`.
    DistanceWithin { center: GeoPoint, radius_m: f64 },
    /// Row's stored point lies inside `bounds`.
    BoxContainsEarth(BoundingBox),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn matches(&self, candidate: &Candidate) -> bool {
        match self {
            Self::ActiveIs(active) => candidate.active == *active,
            Self::DistanceWithin { center, radius_m } => {
                center.great_circle_distance(&candidate.earth) <= *radius_m
            }
            Self::BoxContainsEarth(bounds) => bounds.contains(&candidate.earth),
            Self::And(parts) => parts.iter().all(|part| part.matches(candidate)),
        }
    }
}

/// Fully specified radius query, ready for a store to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceQuery {
    center: GeoPoint,
    radius_m: f64,
    bounds: BoundingBox,
    predicate: Predicate,
    order_by: Vec<OrderBy>,
    pagination: Pagination,
}

impl DistanceQuery {
    pub fn center(&self) -> &GeoPoint {
        &self.center
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Containment box used by the prefilter clause.
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Distance value the store projects for each row.
    pub fn distance_to(&self, earth: &GeoPoint) -> f64 {
        self.center.great_circle_distance(earth)
    }

    /// Compares two hits by the full ordering key list.
    pub fn compare_hits(&self, a: &SearchHit, b: &SearchHit) -> Ordering {
        self.order_by
            .iter()
            .map(|order| order.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Builds a [`DistanceQuery`] from search inputs.
#[derive(Debug, Clone)]
pub struct DistanceQueryBuilder {
    latitude: f64,
    longitude: f64,
    radius_m: f64,
    pagination: Pagination,
    active_only: bool,
}

impl DistanceQueryBuilder {
    /// Starts a query for places within `radius_m` meters of the center.
    pub fn new(latitude: f64, longitude: f64, radius_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_m,
            pagination: Pagination::default(),
            active_only: true,
        }
    }

    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.pagination = Pagination { limit, offset };
        self
    }

    /// Defaults to `true`; `false` drops the `active` clause.
    pub fn active_only(mut self, active_only: bool) -> Self {
        self.active_only = active_only;
        self
    }

    /// Builds the predicate tree, ordering and window.
    ///
    /// # Errors
    /// - `QueryBuildError::Coordinate` for an out-of-range center.
    /// - `QueryBuildError::Radius` for a negative or non-finite radius.
    pub fn build(&self) -> Result<DistanceQuery, QueryBuildError> {
        let center = GeoPoint::from_lat_lon(self.latitude, self.longitude)?;
        if !self.radius_m.is_finite() || self.radius_m < 0.0 {
            return Err(QueryBuildError::Radius(self.radius_m));
        }

        // Chord <= arc, so a cube of half-width `radius` covers the whole cap.
        let bounds = BoundingBox::around(&center, self.radius_m);

        let mut clauses = Vec::with_capacity(3);
        if self.active_only {
            clauses.push(Predicate::ActiveIs(true));
        }
        clauses.push(Predicate::DistanceWithin {
            center,
            radius_m: self.radius_m,
        });
        clauses.push(Predicate::BoxContainsEarth(bounds));

        Ok(DistanceQuery {
            center,
            radius_m: self.radius_m,
            bounds,
            predicate: Predicate::And(clauses),
            order_by: vec![
                OrderBy::asc(SortKey::Distance),
                OrderBy::asc(SortKey::CreatedAt),
                OrderBy::asc(SortKey::PlaceId),
            ],
            pagination: self.pagination,
        })
    }
}
