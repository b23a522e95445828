//! View ledger records

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::identity::ViewerIdentity;
use crate::value_objects::{Snowflake, ViewDedupPolicy};

/// One counted view: unique per (content, identity key, bucket)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRecord {
    pub content_id: Snowflake,
    pub identity: ViewerIdentity,
    pub bucket: i64,
    pub viewed_at: DateTime<Utc>,
}

impl ViewRecord {
    /// Build the record for a view captured now under `policy`
    pub fn capture(
        content_id: Snowflake,
        identity: ViewerIdentity,
        policy: ViewDedupPolicy,
    ) -> Self {
        Self::capture_at(content_id, identity, policy, Utc::now())
    }

    pub fn capture_at(
        content_id: Snowflake,
        identity: ViewerIdentity,
        policy: ViewDedupPolicy,
        viewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            content_id,
            bucket: policy.bucket_for(viewed_at),
            identity,
            viewed_at,
        }
    }
}

/// Result of recording a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewOutcome {
    /// Whether this request incremented the counter
    pub counted: bool,
    pub view_count: i64,
}

impl ViewOutcome {
    pub const fn counted(view_count: i64) -> Self {
        Self {
            counted: true,
            view_count,
        }
    }

    pub const fn ignored(view_count: i64) -> Self {
        Self {
            counted: false,
            view_count,
        }
    }
}
