//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate query building and store execution into use-case level APIs.
//! - Keep callers decoupled from storage details.

pub mod geo_search_service;
