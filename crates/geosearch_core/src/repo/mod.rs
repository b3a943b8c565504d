//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define place data access contracts.
//! - Isolate SQLite statement details from search orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Place::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod place_repo;
