//! Integration test utilities for the share server
//!
//! Helpers for running end-to-end tests against the REST API backed by real
//! PostgreSQL and Redis instances.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
