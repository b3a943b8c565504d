//! Radius search use-case service.
//!
//! # Responsibility
//! - Build the distance query for a request and run it on a place store.
//! - Map ranked hits into the response shape.
//! - Time every call and report start/trace/success/failure to a [`SearchLog`].
//!
//! # Invariants
//! - Read-only; no store mutation.
//! - Store order is preserved; hits are never re-sorted here.
//! - Failures are not retried and keep their original kind.

use crate::config::SearchConfig;
use crate::model::place::{Place, PlaceId};
use crate::search::{
    DistanceQueryBuilder, ExecutionControl, PlaceStore, SearchError, SearchHit, SearchOutcome,
    SearchResult,
};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const DEFAULT_REQUEST_LIMIT: u32 = 20;

fn default_request_limit() -> u32 {
    DEFAULT_REQUEST_LIMIT
}

/// Radius search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoSearchRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_in_meter: u32,
    #[serde(default = "default_request_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    /// Correlates log lines for one request.
    #[serde(default)]
    pub log_id: String,
}

impl GeoSearchRequest {
    pub fn new(latitude: f64, longitude: f64, radius_in_meter: u32) -> Self {
        Self {
            latitude,
            longitude,
            radius_in_meter,
            limit: DEFAULT_REQUEST_LIMIT,
            offset: 0,
            log_id: String::new(),
        }
    }
}

/// Display shape of a place in search responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDto {
    pub place_id: PlaceId,
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub active: bool,
    pub created_at: i64,
}

impl From<&Place> for PlaceDto {
    fn from(place: &Place) -> Self {
        Self {
            place_id: place.id,
            name: place.name.clone(),
            address: place.address.clone(),
            latitude: place.latitude,
            longitude: place.longitude,
            active: place.active,
            created_at: place.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoSearchResponseItem<D = PlaceDto> {
    pub distance: f64,
    pub place: D,
}

/// Ranked response; `items` is in final order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoSearchResponse<D = PlaceDto> {
    pub items: Vec<GeoSearchResponseItem<D>>,
}

/// Receives the diagnostic events of one search call.
pub trait SearchLog {
    fn started(&self, log_id: &str, applied_limit: u32);
    fn prepared(&self, log_id: &str, statement: &str);
    fn succeeded(&self, log_id: &str, elapsed: Duration, item_count: usize);
    fn failed(&self, log_id: &str, elapsed: Duration, err: &SearchError, req: &GeoSearchRequest);
}

/// Writes search events through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacadeSearchLog;

impl SearchLog for LogFacadeSearchLog {
    fn started(&self, log_id: &str, applied_limit: u32) {
        debug!(
            "event=geo_search module=search status=start log_id={} applied_limit={}",
            log_id, applied_limit
        );
    }

    fn prepared(&self, log_id: &str, statement: &str) {
        info!(
            "event=geo_search module=search status=prepared log_id={} sql={}",
            log_id,
            statement.replace('\n', " ")
        );
    }

    fn succeeded(&self, log_id: &str, elapsed: Duration, item_count: usize) {
        info!(
            "event=geo_search module=search status=ok log_id={} duration_ms={} items={}",
            log_id,
            elapsed.as_millis(),
            item_count
        );
    }

    fn failed(&self, log_id: &str, elapsed: Duration, err: &SearchError, req: &GeoSearchRequest) {
        error!(
            "event=geo_search module=search status=error log_id={} duration_ms={} error_kind={:?} error={} req={:?}",
            log_id,
            elapsed.as_millis(),
            err.kind(),
            err,
            req
        );
    }
}

/// Use-case service for radius search over a place store.
pub struct GeoSearchService<S: PlaceStore, L: SearchLog = LogFacadeSearchLog> {
    store: S,
    log: L,
    config: SearchConfig,
}

impl<S: PlaceStore> GeoSearchService<S> {
    /// Creates a service logging through the `log` facade with default config.
    pub fn new(store: S) -> Self {
        Self::with_log(store, LogFacadeSearchLog)
    }
}

impl<S: PlaceStore, L: SearchLog> GeoSearchService<S, L> {
    pub fn with_log(store: S, log: L) -> Self {
        Self {
            store,
            log,
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs a search with the configured deadline.
    pub fn search(&self, req: &GeoSearchRequest) -> SearchOutcome<SearchResult> {
        self.search_with(req, &self.config.execution_control())
    }

    /// Runs a search under caller-provided cancellation/deadline control.
    pub fn search_with(
        &self,
        req: &GeoSearchRequest,
        control: &ExecutionControl,
    ) -> SearchOutcome<SearchResult> {
        let started_at = Instant::now();
        let applied_limit = self.config.apply_limit(req.limit);
        self.log.started(&req.log_id, applied_limit);

        match self.search_inner(req, applied_limit, control) {
            Ok(result) => {
                self.log
                    .succeeded(&req.log_id, started_at.elapsed(), result.len());
                Ok(result)
            }
            Err(err) => {
                self.log
                    .failed(&req.log_id, started_at.elapsed(), &err, req);
                Err(err)
            }
        }
    }

    /// Searches and maps places into [`PlaceDto`].
    pub fn handle(&self, req: &GeoSearchRequest) -> SearchOutcome<GeoSearchResponse> {
        // `PlaceDto::from` alone is bound to one borrow lifetime, not `for<'a>`.
        self.handle_with(req, |place| PlaceDto::from(place))
    }

    /// Searches and maps places with a caller-provided mapper.
    pub fn handle_with<D>(
        &self,
        req: &GeoSearchRequest,
        map: impl Fn(&Place) -> D,
    ) -> SearchOutcome<GeoSearchResponse<D>> {
        let result = self.search(req)?;
        let items = result
            .items
            .iter()
            .map(|hit| GeoSearchResponseItem {
                distance: hit.distance,
                place: map(&hit.place),
            })
            .collect();
        Ok(GeoSearchResponse { items })
    }

    fn search_inner(
        &self,
        req: &GeoSearchRequest,
        applied_limit: u32,
        control: &ExecutionControl,
    ) -> SearchOutcome<SearchResult> {
        let query = DistanceQueryBuilder::new(
            req.latitude,
            req.longitude,
            f64::from(req.radius_in_meter),
        )
        .paginate(applied_limit, req.offset)
        .build()?;

        let statement = self.store.describe(&query)?;
        self.log.prepared(&req.log_id, &statement);

        let items: Vec<SearchHit> = self.store.fetch(&query, control)?;
        Ok(SearchResult { items })
    }
}
