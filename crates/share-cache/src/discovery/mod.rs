//! Discovery selection caches
//!
//! Both implementations store a selection wholesale under its query-shape
//! key and let it expire after the TTL given at write time. Neither offers
//! invalidation: a mutated or deleted content item may be served from a
//! cached selection until that entry expires.

mod memory_store;
mod redis_store;

pub use memory_store::MemoryDiscoveryCache;
pub use redis_store::RedisDiscoveryCache;
