//! # share-api
//!
//! REST API server built with Axum: content views, like toggles, counter
//! reconciliation, and random discovery.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run};
pub use state::AppState;
