//! # share-core
//!
//! Domain layer for the engagement-and-discovery subsystem: content records,
//! view and like facts, denormalized counters, viewer identity resolution,
//! and the repository/cache traits the infrastructure crates implement.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod identity;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    CategoryScope, Content, ContentStatus, ContentSummary, CounterDelta, CounterDrift,
    CounterField, Counters, DiscoveryKey, DiscoverySelection, LikeOutcome, LikeRecord,
    Reconciliation, ViewOutcome, ViewRecord,
};
pub use error::DomainError;
pub use identity::{resolve_identity, IdentityKind, RequestSignals, ViewerIdentity};
pub use traits::{
    ContentRepository, CounterRepository, DiscoveryCache, LikeRepository, RepoResult,
    ViewRepository,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError, ViewDedupPolicy};
