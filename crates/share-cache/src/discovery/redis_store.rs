//! Redis-backed discovery cache
//!
//! Key: `discover:{category|all}:{status}` → JSON selection, `SET EX ttl`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use share_core::entities::{DiscoveryKey, DiscoverySelection};
use share_core::traits::{DiscoveryCache, RepoResult};

use crate::pool::RedisPool;

/// Discovery cache shared by every API instance through Redis
#[derive(Clone, Debug)]
pub struct RedisDiscoveryCache {
    pool: RedisPool,
}

impl RedisDiscoveryCache {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiscoveryCache for RedisDiscoveryCache {
    #[instrument(skip(self), fields(key = %key.cache_key()))]
    async fn get(&self, key: &DiscoveryKey) -> RepoResult<Option<DiscoverySelection>> {
        Ok(self.pool.get_json(&key.cache_key()).await?)
    }

    #[instrument(skip(self, selection), fields(key = %key.cache_key(), items = selection.items.len()))]
    async fn put(
        &self,
        key: &DiscoveryKey,
        selection: &DiscoverySelection,
        ttl: Duration,
    ) -> RepoResult<()> {
        Ok(self.pool.set_json(&key.cache_key(), selection, ttl).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RedisDiscoveryCache>();
    }
}
