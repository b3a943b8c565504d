//! Domain model for searchable places.
//!
//! # Invariants
//! - Every place is identified by a stable `PlaceId`.
//! - Places are deactivated, never hard-deleted, by core APIs.

pub mod place;
