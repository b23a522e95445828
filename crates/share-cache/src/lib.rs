//! # share-cache
//!
//! Caching layer for randomized discovery selections.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Discovery caches**: Redis-backed (shared across instances) and
//!   in-process implementations of `share_core::DiscoveryCache`
//!
//! ## Example
//!
//! ```ignore
//! use share_cache::{RedisDiscoveryCache, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let cache = RedisDiscoveryCache::new(pool);
//! cache.put(&key, &selection, Duration::from_secs(60)).await?;
//! ```

pub mod discovery;
pub mod pool;

pub use discovery::{MemoryDiscoveryCache, RedisDiscoveryCache};
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};
