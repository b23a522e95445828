//! View deduplication policy
//!
//! A view record is unique per (content, identity key, bucket). The policy
//! decides which bucket a view falls into:
//!
//! - `Permanent`: every view lands in bucket 0, so an identity is counted at
//!   most once per content, ever.
//! - `Cooldown`: buckets are fixed windows of `window_secs` seconds, so an
//!   identity is counted at most once per content per window.

use chrono::{DateTime, Utc};

/// Bucket used for every view under the permanent policy
const PERMANENT_BUCKET: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewDedupPolicy {
    #[default]
    Permanent,
    Cooldown { window_secs: i64 },
}

impl ViewDedupPolicy {
    /// Build a policy from an optional window length; `None` or `0` means permanent
    pub fn from_window_secs(window_secs: Option<u64>) -> Self {
        match window_secs.and_then(|w| i64::try_from(w).ok()) {
            Some(w) if w > 0 => Self::Cooldown { window_secs: w },
            _ => Self::Permanent,
        }
    }

    /// Bucket a view captured at `at` belongs to
    pub fn bucket_for(&self, at: DateTime<Utc>) -> i64 {
        match self {
            Self::Permanent => PERMANENT_BUCKET,
            Self::Cooldown { window_secs } => at.timestamp().div_euclid(*window_secs),
        }
    }

    /// Length of one dedup window; `None` under the permanent policy
    pub fn window(&self) -> Option<chrono::Duration> {
        match self {
            Self::Permanent => None,
            Self::Cooldown { window_secs } => Some(chrono::Duration::seconds(*window_secs)),
        }
    }

    /// Old view records may only be pruned when they no longer act as dedup memory
    pub fn allows_pruning(&self) -> bool {
        matches!(self, Self::Cooldown { .. })
    }
}

impl std::fmt::Display for ViewDedupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permanent => write!(f, "permanent"),
            Self::Cooldown { window_secs } => write!(f, "cooldown({window_secs}s)"),
        }
    }
}
