//! # share-db
//!
//! Database layer implementing the share-core repository traits with
//! PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations for content, the view ledger, the like
//!   registry, and the denormalized counters
//!
//! ## Usage
//!
//! ```rust,ignore
//! use share_db::{create_pool, run_migrations, PoolConfig, PgViewRepository};
//!
//! async fn example(url: &str) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::from_url(url)).await?;
//!     run_migrations(&pool).await?;
//!     let views = PgViewRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgContentRepository, PgCounterRepository, PgLikeRepository, PgViewRepository,
};
