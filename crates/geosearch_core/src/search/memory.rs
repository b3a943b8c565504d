//! In-process place store that evaluates query descriptors directly.

use super::error::{SearchError, SearchOutcome};
use super::hit::SearchHit;
use super::query::{Candidate, DistanceQuery};
use super::store::{ExecutionControl, PlaceStore};
use crate::model::place::Place;
use std::time::Instant;

/// Linear-scan store over owned places.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlaceStore {
    places: Vec<Place>,
}

impl MemoryPlaceStore {
    pub fn new(places: Vec<Place>) -> Self {
        Self { places }
    }

    pub fn insert(&mut self, place: Place) {
        self.places.push(place);
    }

    pub fn places_mut(&mut self) -> &mut [Place] {
        &mut self.places
    }
}

impl PlaceStore for MemoryPlaceStore {
    fn describe(&self, query: &DistanceQuery) -> SearchOutcome<String> {
        Ok(format!(
            "memory scan places={} where={:?} order_by={:?} {:?}",
            self.places.len(),
            query.predicate(),
            query.order_by(),
            query.pagination()
        ))
    }

    fn fetch(
        &self,
        query: &DistanceQuery,
        control: &ExecutionControl,
    ) -> SearchOutcome<Vec<SearchHit>> {
        let started_at = Instant::now();
        control.check(started_at)?;
        let mut hits = Vec::new();

        for place in &self.places {
            control.check(started_at)?;
            let earth = place
                .geo_point()
                .map_err(|err| SearchError::InvalidData(format!("place {}: {err}", place.id)))?;
            let candidate = Candidate {
                earth,
                active: place.active,
            };
            if query.predicate().matches(&candidate) {
                hits.push(SearchHit {
                    distance: query.distance_to(&earth),
                    place: place.clone(),
                });
            }
        }

        hits.sort_by(|a, b| query.compare_hits(a, b));
        Ok(query.pagination().window(hits))
    }
}
