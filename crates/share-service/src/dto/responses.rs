//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

use share_core::{ContentStatus, ContentSummary, CounterDrift, Snowflake, ViewOutcome};

// ============================================================================
// Content Responses
// ============================================================================

/// Content with its counters; `view` is present when the read also
/// recorded a view
#[derive(Debug, Clone, Serialize)]
pub struct ContentResponse {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    pub category_id: Snowflake,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    pub status: ContentStatus,
    pub view_count: i64,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewResponse>,
    /// Whether the authenticated caller likes this content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
}

// ============================================================================
// Engagement Responses
// ============================================================================

/// Result of recording a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewResponse {
    pub counted: bool,
    pub view_count: i64,
}

/// Result of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

// ============================================================================
// Discovery Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResponse {
    pub items: Vec<ContentSummary>,
    pub generated_at: DateTime<Utc>,
}

// ============================================================================
// Counter Maintenance Responses
// ============================================================================

/// Counters after a reconcile, with the drift that was repaired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub content_id: Snowflake,
    pub view_count: i64,
    pub like_count: i64,
    pub drift: Option<CounterDrift>,
}

/// Totals of one `reconcile_all` sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReconcileSummary {
    pub checked: u64,
    pub drifted: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub removed: u64,
    pub cutoff: DateTime<Utc>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness response with per-dependency checks
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// `healthy`, `unhealthy`, or `disabled` when the dependency is not wired
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    /// `None` marks a dependency this instance does not use
    pub fn from_checks(db: Option<bool>, redis: Option<bool>) -> Self {
        fn label(check: Option<bool>) -> String {
            match check {
                Some(true) => "healthy",
                Some(false) => "unhealthy",
                None => "disabled",
            }
            .to_string()
        }

        let ready = db != Some(false) && redis != Some(false);
        Self {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: label(db),
                redis: label(redis),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

impl From<ViewOutcome> for ViewResponse {
    fn from(outcome: ViewOutcome) -> Self {
        Self {
            counted: outcome.counted,
            view_count: outcome.view_count,
        }
    }
}
