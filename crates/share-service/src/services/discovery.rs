//! Discovery service
//!
//! Randomized "discover" selections, cached per query shape for the
//! configured TTL. Concurrent misses each recompute and overwrite the entry;
//! the cache is never required for correctness, so its failures degrade to
//! a recompute.

use share_core::entities::{CategoryScope, ContentStatus, DiscoveryKey, DiscoverySelection};
use share_core::Snowflake;
use tracing::{debug, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Discovery service
pub struct DiscoveryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DiscoveryService<'a> {
    /// Create a new DiscoveryService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// One random item per category, or one random item of `category_id`,
    /// among content with `status`
    #[instrument(skip(self))]
    pub async fn get_random(
        &self,
        category_id: Option<Snowflake>,
        status: ContentStatus,
    ) -> ServiceResult<DiscoverySelection> {
        let key = DiscoveryKey::new(CategoryScope::from(category_id), status);

        match self.ctx.discovery_cache().get(&key).await {
            Ok(Some(selection)) => {
                debug!(key = %key.cache_key(), "Discovery cache hit");
                return Ok(selection);
            }
            Ok(None) => debug!(key = %key.cache_key(), "Discovery cache miss"),
            Err(e) => warn!(
                key = %key.cache_key(),
                error = %e,
                "Discovery cache read failed, recomputing"
            ),
        }

        let selection = self.compute(key).await?;

        if let Err(e) = self
            .ctx
            .discovery_cache()
            .put(&key, &selection, self.ctx.discovery_ttl())
            .await
        {
            warn!(key = %key.cache_key(), error = %e, "Discovery cache write failed");
        }

        Ok(selection)
    }

    async fn compute(&self, key: DiscoveryKey) -> ServiceResult<DiscoverySelection> {
        let repo = self.ctx.content_repo();
        let items = match key.scope {
            CategoryScope::All => repo
                .random_per_category(key.status)
                .await?
                .iter()
                .map(|content| content.summary())
                .collect(),
            CategoryScope::Category(category_id) => repo
                .random_in_category(category_id, key.status)
                .await?
                .map(|content| content.summary())
                .into_iter()
                .collect(),
        };

        Ok(DiscoverySelection::new(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use share_cache::MemoryDiscoveryCache;
    use share_common::EngagementConfig;
    use share_core::Counters;

    use crate::testing::{self, InMemoryStore, UnavailableCache};

    fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        // Categories 10 and 20 with several published items each, plus a
        // draft that must never be picked for `published`
        for id in 1..=5 {
            store.seed_content(testing::sample_content(id, 10));
        }
        for id in 6..=8 {
            store.seed_content(testing::sample_content(id, 20));
        }
        let mut draft = testing::sample_content(9, 30);
        draft.status = ContentStatus::Draft;
        store.seed_content(draft);
        store
    }

    fn ttl_config(secs: u64) -> EngagementConfig {
        EngagementConfig {
            discovery_cache_ttl_secs: secs,
            ..EngagementConfig::default()
        }
    }

    #[tokio::test]
    async fn test_one_item_per_category() {
        let store = seeded();
        let ctx = testing::context(&store, Arc::new(MemoryDiscoveryCache::new()), ttl_config(60));

        let selection = DiscoveryService::new(&ctx)
            .get_random(None, ContentStatus::Published)
            .await
            .unwrap();

        let categories: HashSet<Snowflake> =
            selection.items.iter().map(|item| item.category_id).collect();
        assert_eq!(selection.items.len(), 2);
        assert_eq!(
            categories,
            HashSet::from([Snowflake::new(10), Snowflake::new(20)])
        );
    }

    #[tokio::test]
    async fn test_single_category_and_status_filter() {
        let store = seeded();
        let ctx = testing::context(&store, Arc::new(MemoryDiscoveryCache::new()), ttl_config(60));
        let service = DiscoveryService::new(&ctx);

        let pick = service
            .get_random(Some(Snowflake::new(20)), ContentStatus::Published)
            .await
            .unwrap();
        assert_eq!(pick.items.len(), 1);
        assert_eq!(pick.items[0].category_id, Snowflake::new(20));

        let drafts = service
            .get_random(None, ContentStatus::Draft)
            .await
            .unwrap();
        assert_eq!(drafts.items.len(), 1);
        assert_eq!(drafts.items[0].id, Snowflake::new(9));

        let nothing = service
            .get_random(Some(Snowflake::new(30)), ContentStatus::Published)
            .await
            .unwrap();
        assert!(nothing.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_within_ttl_is_identical() {
        let store = seeded();
        let ctx = testing::context(&store, Arc::new(MemoryDiscoveryCache::new()), ttl_config(60));
        let service = DiscoveryService::new(&ctx);
        let category = Some(Snowflake::new(10));

        let first = service
            .get_random(category, ContentStatus::Published)
            .await
            .unwrap();

        // New content does not show up until expiry
        store.seed_content(testing::sample_content(50, 10));
        tokio::time::advance(Duration::from_secs(59)).await;

        for _ in 0..10 {
            let again = service
                .get_random(category, ContentStatus::Published)
                .await
                .unwrap();
            assert_eq!(again, first);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_recomputes() {
        let store = InMemoryStore::new();
        store.seed_content(testing::sample_content(1, 10));
        let ctx = testing::context(&store, Arc::new(MemoryDiscoveryCache::new()), ttl_config(60));
        let service = DiscoveryService::new(&ctx);

        service
            .get_random(None, ContentStatus::Published)
            .await
            .unwrap();

        // Counters changed meanwhile; the cached copy still shows the old ones
        store.set_counters(Snowflake::new(1), Counters::new(5, 0));
        let cached = service
            .get_random(None, ContentStatus::Published)
            .await
            .unwrap();
        assert_eq!(cached.items[0].view_count, 0);

        tokio::time::advance(Duration::from_secs(61)).await;
        let fresh = service
            .get_random(None, ContentStatus::Published)
            .await
            .unwrap();
        assert_eq!(fresh.items[0].view_count, 5);
    }

    #[tokio::test]
    async fn test_cache_failure_degrades_to_recompute() {
        let store = seeded();
        let ctx = testing::context(&store, Arc::new(UnavailableCache), ttl_config(60));

        let selection = DiscoveryService::new(&ctx)
            .get_random(None, ContentStatus::Published)
            .await
            .unwrap();

        assert_eq!(selection.items.len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = seeded();
        store.set_store_down(true);
        let ctx = testing::context(&store, Arc::new(MemoryDiscoveryCache::new()), ttl_config(60));

        let err = DiscoveryService::new(&ctx)
            .get_random(None, ContentStatus::Published)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 503);
    }

    #[tokio::test]
    async fn test_keys_do_not_share_entries() {
        let store = seeded();
        let cache = Arc::new(MemoryDiscoveryCache::new());
        let ctx = testing::context(&store, cache.clone(), ttl_config(60));
        let service = DiscoveryService::new(&ctx);

        service
            .get_random(None, ContentStatus::Published)
            .await
            .unwrap();
        service
            .get_random(Some(Snowflake::new(10)), ContentStatus::Published)
            .await
            .unwrap();
        service
            .get_random(None, ContentStatus::Archived)
            .await
            .unwrap();

        assert_eq!(cache.len(), 3);
    }
}
