//! Integration tests for the Redis discovery cache
//!
//! These tests require a running Redis server:
//!
//! ```bash
//! export REDIS_URL="redis://127.0.0.1:6379"
//! cargo test -p share-cache --test redis_tests
//! ```

use std::time::Duration;

use redis::AsyncCommands;

use share_cache::{RedisDiscoveryCache, RedisPool, RedisPoolConfig};
use share_core::entities::{
    CategoryScope, ContentStatus, ContentSummary, DiscoveryKey, DiscoverySelection,
};
use share_core::traits::DiscoveryCache;
use share_core::value_objects::{Snowflake, SnowflakeGenerator};

/// Pool against REDIS_URL, or None when Redis is not reachable
async fn get_test_pool() -> Option<RedisPool> {
    let url = std::env::var("REDIS_URL").ok()?;
    let pool = RedisPool::new(RedisPoolConfig {
        url,
        max_connections: 4,
    })
    .ok()?;
    pool.health_check().await.ok()?;
    Some(pool)
}

/// A category id no other run has used, so keys never collide
fn unique_key() -> DiscoveryKey {
    let id = SnowflakeGenerator::new(7).generate();
    DiscoveryKey::new(CategoryScope::Category(id), ContentStatus::Published)
}

fn selection() -> DiscoverySelection {
    DiscoverySelection::new(vec![ContentSummary {
        id: Snowflake::new(42),
        owner_id: Snowflake::new(1),
        category_id: Snowflake::new(2),
        title: "Cached pick".to_string(),
        media_url: Some("/media/42.jpg".to_string()),
        status: ContentStatus::Published,
        view_count: 3,
        like_count: 1,
    }])
}

#[tokio::test]
async fn test_put_then_get_returns_same_selection() {
    let Some(pool) = get_test_pool().await else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    let cache = RedisDiscoveryCache::new(pool.clone());
    let key = unique_key();
    let stored = selection();

    assert!(cache.get(&key).await.unwrap().is_none());
    cache.put(&key, &stored, Duration::from_secs(30)).await.unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), Some(stored));

    let mut conn = pool.get().await.unwrap();
    let ttl: i64 = conn.ttl(key.cache_key()).await.unwrap();
    assert!(ttl > 0 && ttl <= 30);

    let _: i64 = conn.del(key.cache_key()).await.unwrap();
}

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let Some(pool) = get_test_pool().await else {
        eprintln!("Skipping test: REDIS_URL not set");
        return;
    };

    let cache = RedisDiscoveryCache::new(pool);
    let key = unique_key();

    cache.put(&key, &selection(), Duration::from_secs(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2100)).await;

    assert!(cache.get(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreachable_redis_is_cache_unavailable() {
    let pool = RedisPool::new(RedisPoolConfig {
        url: "redis://127.0.0.1:1".to_string(),
        max_connections: 1,
    })
    .unwrap();
    let cache = RedisDiscoveryCache::new(pool);

    let err = cache.get(&unique_key()).await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.code(), "CACHE_UNAVAILABLE");
}
