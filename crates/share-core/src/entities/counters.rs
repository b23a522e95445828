//! Denormalized engagement counters and their reconciliation results

use serde::Serialize;

use crate::value_objects::Snowflake;

/// Counter column on the content record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterField {
    ViewCount,
    LikeCount,
}

impl CounterField {
    /// Column name in the `contents` table
    pub fn column(&self) -> &'static str {
        match self {
            Self::ViewCount => "view_count",
            Self::LikeCount => "like_count",
        }
    }
}

impl std::fmt::Display for CounterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// A single-step counter adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterDelta {
    Increment,
    Decrement,
}

impl CounterDelta {
    #[inline]
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Increment => 1,
            Self::Decrement => -1,
        }
    }
}

/// Snapshot of both counters for one content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counters {
    pub view_count: i64,
    pub like_count: i64,
}

impl Counters {
    pub const fn new(view_count: i64, like_count: i64) -> Self {
        Self {
            view_count,
            like_count,
        }
    }

    pub fn get(&self, field: CounterField) -> i64 {
        match field {
            CounterField::ViewCount => self.view_count,
            CounterField::LikeCount => self.like_count,
        }
    }
}

/// Stored counters versus the values recomputed from the fact tables,
/// captured in the same transaction that overwrote them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub content_id: Snowflake,
    pub stored: Counters,
    pub recomputed: Counters,
}

impl Reconciliation {
    /// Drift between stored and recomputed counters, if any field differs by
    /// more than `tolerance`
    pub fn drift(&self, tolerance: i64) -> Option<CounterDrift> {
        let drift = CounterDrift {
            content_id: self.content_id,
            view_delta: self.recomputed.view_count - self.stored.view_count,
            like_delta: self.recomputed.like_count - self.stored.like_count,
        };
        drift.exceeds(tolerance).then_some(drift)
    }
}

/// Difference found by reconciliation (recomputed minus stored)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounterDrift {
    pub content_id: Snowflake,
    pub view_delta: i64,
    pub like_delta: i64,
}

impl CounterDrift {
    pub fn exceeds(&self, tolerance: i64) -> bool {
        self.view_delta.abs() > tolerance || self.like_delta.abs() > tolerance
    }
}
