//! Ranked search output.

use crate::model::place::Place;
use serde::Serialize;

/// One matching place and its great-circle distance from the search center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Meters.
    pub distance: f64,
    pub place: Place,
}

/// Hits in final rank order.
///
/// Order is fixed when the result is built; consumers must not re-sort.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResult {
    pub items: Vec<SearchHit>,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
