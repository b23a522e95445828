//! Repository traits (ports) - define the interface for data access
//!
//! The fact-table ports write a fact row and its denormalized counter as one
//! unit, so a counter never moves without its row and never misses one.
//! Deduplication rests on the store's primary keys, never on a prior read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Content, ContentStatus, CounterDelta, CounterField, Counters, LikeOutcome, LikeRecord,
    Reconciliation, ViewRecord,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Content Repository
// ============================================================================

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Find content by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Content>>;

    /// Create a new content item
    async fn create(&self, content: &Content) -> RepoResult<()>;

    /// Hard delete; view and like records go with it.
    /// Returns false if the content did not exist.
    async fn delete(&self, id: Snowflake) -> RepoResult<bool>;

    /// One random item per category with the given status
    async fn random_per_category(&self, status: ContentStatus) -> RepoResult<Vec<Content>>;

    /// A single random item of one category with the given status
    async fn random_in_category(
        &self,
        category_id: Snowflake,
        status: ContentStatus,
    ) -> RepoResult<Option<Content>>;

    /// Content ids strictly greater than `cursor`, ascending
    async fn ids_after(&self, cursor: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// View Repository
// ============================================================================

#[async_trait]
pub trait ViewRepository: Send + Sync {
    /// Insert unless (content, identity, bucket) already exists, and bump
    /// `view_count` in the same statement. Returns the new count when a row
    /// was inserted, `None` for a duplicate. Fails with `ContentNotFound`
    /// when the content does not exist; nothing is written on failure.
    async fn record(&self, record: &ViewRecord) -> RepoResult<Option<i64>>;

    /// Delete view records captured before `cutoff`; returns rows removed
    async fn prune_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// Like Repository
// ============================================================================

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Delete the (content, user) pair if present, else insert it, moving
    /// `like_count` with the row in one transaction. Toggles on the same
    /// content serialize on the content row.
    async fn toggle(&self, record: &LikeRecord) -> RepoResult<LikeOutcome>;

    /// Check whether the user likes the content
    async fn exists(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Counter Repository
// ============================================================================

#[async_trait]
pub trait CounterRepository: Send + Sync {
    /// Atomically apply `delta` to one counter, clamped at zero.
    /// Returns the new value.
    async fn adjust(
        &self,
        content_id: Snowflake,
        field: CounterField,
        delta: CounterDelta,
    ) -> RepoResult<i64>;

    /// Current stored counters
    async fn get(&self, content_id: Snowflake) -> RepoResult<Counters>;

    /// Recount both fact tables under the content row lock and overwrite the
    /// stored counters, all in one transaction
    async fn reconcile(&self, content_id: Snowflake) -> RepoResult<Reconciliation>;
}
