//! Store execution contract for distance queries.
//!
//! # Invariants
//! - A store returns hits already in the query's rank order and window.
//! - A cancelled or expired call fails as a whole; no partial hits.

use super::error::{SearchError, SearchOutcome};
use super::hit::SearchHit;
use super::query::DistanceQuery;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Executes [`DistanceQuery`] descriptors against place storage.
pub trait PlaceStore {
    /// Human-readable statement for trace logging.
    fn describe(&self, query: &DistanceQuery) -> SearchOutcome<String>;

    /// Runs the query, honoring `control` for cancellation and deadline.
    fn fetch(
        &self,
        query: &DistanceQuery,
        control: &ExecutionControl,
    ) -> SearchOutcome<Vec<SearchHit>>;
}

impl<S: PlaceStore + ?Sized> PlaceStore for &S {
    fn describe(&self, query: &DistanceQuery) -> SearchOutcome<String> {
        (**self).describe(query)
    }

    fn fetch(
        &self,
        query: &DistanceQuery,
        control: &ExecutionControl,
    ) -> SearchOutcome<Vec<SearchHit>> {
        (**self).fetch(query, control)
    }
}

/// Shared flag that asks an in-flight search to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Cancellation and deadline for one store call.
#[derive(Debug, Clone, Default)]
pub struct ExecutionControl {
    pub cancel: Option<CancelToken>,
    pub timeout: Option<Duration>,
}

impl ExecutionControl {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: None,
            timeout: Some(timeout),
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.cancel.is_none() && self.timeout.is_none()
    }

    pub fn deadline(&self, started_at: Instant) -> Option<Instant> {
        self.timeout.map(|timeout| started_at + timeout)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Fails with `Cancelled` or `Timeout` once either condition holds.
    pub fn check(&self, started_at: Instant) -> SearchOutcome<()> {
        if self.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        if let (Some(timeout), Some(deadline)) = (self.timeout, self.deadline(started_at)) {
            if Instant::now() >= deadline {
                return Err(SearchError::Timeout { limit: timeout });
            }
        }
        Ok(())
    }
}
