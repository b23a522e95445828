//! Route definitions
//!
//! Engagement and discovery routes are mounted under /api/v1.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{contents, discover, health};
use crate::state::AppState;

/// API router (health routes are exported separately to bypass rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(content_routes())
        .route("/discover", get(discover::get_random))
}

fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/contents", post(contents::create_content))
        .route(
            "/contents/:content_id",
            get(contents::get_content).delete(contents::delete_content),
        )
        .route("/contents/:content_id/views", post(contents::record_view))
        .route("/contents/:content_id/like", post(contents::toggle_like))
        .route(
            "/contents/:content_id/reconcile",
            post(contents::reconcile_content),
        )
}
