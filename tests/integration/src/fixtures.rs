//! Test fixtures and data generators
//!
//! Users and categories belong to other services, so tests insert them
//! directly; content goes through the API.

use std::sync::OnceLock;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use share_core::{Snowflake, SnowflakeGenerator};
use sqlx::PgPool;

/// Time-ordered ids stay unique across runs against the same database
pub fn unique_id() -> Snowflake {
    static GENERATOR: OnceLock<SnowflakeGenerator> = OnceLock::new();
    GENERATOR
        .get_or_init(|| SnowflakeGenerator::new(1001))
        .generate()
}

pub async fn seed_user(pool: &PgPool) -> Result<Snowflake> {
    let id = unique_id();
    sqlx::query("INSERT INTO users (id, username) VALUES ($1, $2)")
        .bind(id.into_inner())
        .bind(format!("it_user_{id}"))
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn seed_category(pool: &PgPool) -> Result<Snowflake> {
    let id = unique_id();
    sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
        .bind(id.into_inner())
        .bind(format!("it_category_{id}"))
        .execute(pool)
        .await?;
    Ok(id)
}

/// Overwrite stored counters, simulating drift
pub async fn force_counters(pool: &PgPool, content_id: &str, views: i64, likes: i64) -> Result<()> {
    sqlx::query("UPDATE contents SET view_count = $2, like_count = $3 WHERE id = $1")
        .bind(content_id.parse::<i64>()?)
        .bind(views)
        .bind(likes)
        .execute(pool)
        .await?;
    Ok(())
}

/// Success envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateContentRequest {
    pub category_id: String,
    pub title: String,
    pub status: String,
}

impl CreateContentRequest {
    pub fn published(category_id: Snowflake) -> Self {
        Self {
            category_id: category_id.to_string(),
            title: format!("Item {}", unique_id()),
            status: "published".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContentBody {
    pub id: String,
    pub owner_id: String,
    pub category_id: String,
    pub title: String,
    pub status: String,
    pub view_count: i64,
    pub like_count: i64,
    pub view: Option<ViewBody>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ViewBody {
    pub counted: bool,
    pub view_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LikeBody {
    pub liked: bool,
    pub like_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct DiscoveryBody {
    pub items: Vec<ContentSummaryBody>,
    pub generated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentSummaryBody {
    pub id: String,
    pub category_id: String,
    pub view_count: i64,
    pub like_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReconcileBody {
    pub content_id: String,
    pub view_count: i64,
    pub like_count: i64,
    pub drift: Option<DriftBody>,
}

#[derive(Debug, Deserialize)]
pub struct DriftBody {
    pub view_delta: i64,
    pub like_delta: i64,
}
