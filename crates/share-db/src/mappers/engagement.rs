//! View and like record mappers

use chrono::{DateTime, Utc};
use share_core::entities::{LikeRecord, ViewRecord};

/// View record values for insertion
pub struct ViewInsert {
    pub content_id: i64,
    pub identity_key: String,
    pub identity_kind: &'static str,
    pub bucket: i64,
    pub viewed_at: DateTime<Utc>,
}

impl ViewInsert {
    pub fn new(record: &ViewRecord) -> Self {
        Self {
            content_id: record.content_id.into_inner(),
            identity_key: record.identity.storage_key(),
            identity_kind: record.identity.kind.as_str(),
            bucket: record.bucket,
            viewed_at: record.viewed_at,
        }
    }
}

/// Like record values for insertion
pub struct LikeInsert {
    pub content_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl LikeInsert {
    pub fn new(record: &LikeRecord) -> Self {
        Self {
            content_id: record.content_id.into_inner(),
            user_id: record.user_id.into_inner(),
            created_at: record.created_at,
        }
    }
}
