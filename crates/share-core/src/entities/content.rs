//! Content entity - a published or draft item owned by a user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{ContentSummary, Counters};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Publication state of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    #[default]
    Published,
    Archived,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

/// Content entity
///
/// `view_count` and `like_count` are denormalized from the view ledger and
/// like registry. Only the counter synchronizer writes them; content edits
/// touch the remaining fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    pub category_id: Snowflake,
    pub title: String,
    pub media_url: Option<String>,
    pub status: ContentStatus,
    pub view_count: i64,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Content {
    /// Create a new content item with zeroed counters
    pub fn new(
        id: Snowflake,
        owner_id: Snowflake,
        category_id: Snowflake,
        title: impl Into<String>,
        status: ContentStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id,
            category_id,
            title: title.into(),
            media_url: None,
            status,
            view_count: 0,
            like_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_media_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }

    #[inline]
    pub fn is_published(&self) -> bool {
        self.status == ContentStatus::Published
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    pub fn counters(&self) -> Counters {
        Counters::new(self.view_count, self.like_count)
    }

    pub fn summary(&self) -> ContentSummary {
        ContentSummary {
            id: self.id,
            owner_id: self.owner_id,
            category_id: self.category_id,
            title: self.title.clone(),
            media_url: self.media_url.clone(),
            status: self.status,
            view_count: self.view_count,
            like_count: self.like_count,
        }
    }
}
