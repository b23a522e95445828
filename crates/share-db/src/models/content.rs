//! Content database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for contents table
#[derive(Debug, Clone, FromRow)]
pub struct ContentModel {
    pub id: i64,
    pub owner_id: i64,
    pub category_id: i64,
    pub title: String,
    pub media_url: Option<String>,
    pub status: String,
    pub view_count: i64,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Counter pair, either stored or recomputed from the fact tables
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CountersModel {
    pub view_count: i64,
    pub like_count: i64,
}
