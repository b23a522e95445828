//! Discovery selections and their cache keys

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::ContentStatus;
use crate::value_objects::Snowflake;

/// Key prefix for cached discovery selections
pub const DISCOVERY_KEY_PREFIX: &str = "discover";

/// Which categories a discovery query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryScope {
    /// One random item per category
    All,
    /// A single random item of one category
    Category(Snowflake),
}

impl From<Option<Snowflake>> for CategoryScope {
    fn from(category: Option<Snowflake>) -> Self {
        category.map_or(Self::All, Self::Category)
    }
}

impl std::fmt::Display for CategoryScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Category(id) => write!(f, "{id}"),
        }
    }
}

/// Query shape of a discovery request; selections are cached per key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiscoveryKey {
    pub scope: CategoryScope,
    pub status: ContentStatus,
}

impl DiscoveryKey {
    pub fn new(scope: CategoryScope, status: ContentStatus) -> Self {
        Self { scope, status }
    }

    /// `discover:{category|all}:{status}`
    pub fn cache_key(&self) -> String {
        format!("{}:{}:{}", DISCOVERY_KEY_PREFIX, self.scope, self.status)
    }
}

/// Content fields carried in a discovery selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    pub category_id: Snowflake,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub media_url: Option<String>,
    pub status: ContentStatus,
    pub view_count: i64,
    pub like_count: i64,
}

/// A randomized selection, cached wholesale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySelection {
    pub items: Vec<ContentSummary>,
    pub generated_at: DateTime<Utc>,
}

impl DiscoverySelection {
    pub fn new(items: Vec<ContentSummary>) -> Self {
        Self {
            items,
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
