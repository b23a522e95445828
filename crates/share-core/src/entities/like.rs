//! Like registry records

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::Snowflake;

/// Existence of a row means the user likes the content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeRecord {
    pub content_id: Snowflake,
    pub user_id: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl LikeRecord {
    pub fn new(content_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            content_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Result of a like toggle; `liked` is the state after the operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub like_count: i64,
}
