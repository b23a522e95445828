//! In-memory ports for service and handler tests
//!
//! [`InMemoryStore`] implements every repository trait over one shared,
//! mutex-guarded state. It enforces the same keys and references as the
//! PostgreSQL schema: view and like facts are unique per primary key,
//! writes against unknown content fail with `ContentNotFound`, a fact row
//! and its counter step land together or not at all, and counter
//! adjustments clamp at zero.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;

use share_common::{EngagementConfig, JwtService};
use share_core::entities::{
    Content, ContentStatus, CounterDelta, CounterField, Counters, DiscoveryKey,
    DiscoverySelection, LikeOutcome, LikeRecord, Reconciliation, ViewRecord,
};
use share_core::traits::{
    ContentRepository, CounterRepository, DiscoveryCache, LikeRepository, RepoResult,
    ViewRepository,
};
use share_core::{DomainError, Snowflake};

use crate::services::ServiceContext;

/// Secret used by [`context`] for its JWT service
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-engagement-tests";

#[derive(Debug, Default)]
struct State {
    users: HashSet<Snowflake>,
    categories: HashSet<Snowflake>,
    contents: BTreeMap<Snowflake, Content>,
    views: HashMap<(Snowflake, String, i64), DateTime<Utc>>,
    likes: HashMap<(Snowflake, Snowflake), DateTime<Utc>>,
}

impl State {
    fn content_mut(&mut self, id: Snowflake) -> RepoResult<&mut Content> {
        self.contents
            .get_mut(&id)
            .ok_or(DomainError::ContentNotFound(id))
    }

    fn view_rows(&self, content_id: Snowflake) -> i64 {
        self.views.keys().filter(|(c, _, _)| *c == content_id).count() as i64
    }

    fn like_rows(&self, content_id: Snowflake) -> i64 {
        self.likes.keys().filter(|(c, _)| *c == content_id).count() as i64
    }
}

#[derive(Debug, Default)]
struct Faults {
    store_down: AtomicBool,
    counters_down: AtomicBool,
}

/// Shared in-memory store implementing all repository ports
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    faults: Arc<Faults>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Yield before every store call so concurrent tasks interleave
    /// between calls, as they would over a network round trip
    async fn enter(&self) -> RepoResult<()> {
        tokio::task::yield_now().await;
        if self.faults.store_down.load(Ordering::SeqCst) {
            return Err(DomainError::StoreUnavailable("store is down".to_string()));
        }
        Ok(())
    }

    fn check_counters(&self) -> RepoResult<()> {
        if self.faults.counters_down.load(Ordering::SeqCst) {
            return Err(DomainError::StoreUnavailable(
                "counter update failed".to_string(),
            ));
        }
        Ok(())
    }

    pub fn add_user(&self, id: Snowflake) {
        self.state().users.insert(id);
    }

    pub fn add_category(&self, id: Snowflake) {
        self.state().categories.insert(id);
    }

    /// Register owner and category, then store the content as given
    pub fn seed_content(&self, content: Content) {
        let mut state = self.state();
        state.users.insert(content.owner_id);
        state.categories.insert(content.category_id);
        state.contents.insert(content.id, content);
    }

    /// Overwrite stored counters without touching the fact tables
    pub fn set_counters(&self, content_id: Snowflake, counters: Counters) {
        if let Some(content) = self.state().contents.get_mut(&content_id) {
            content.view_count = counters.view_count;
            content.like_count = counters.like_count;
        }
    }

    pub fn stored_counters(&self, content_id: Snowflake) -> Option<Counters> {
        self.state().contents.get(&content_id).map(Content::counters)
    }

    pub fn view_rows(&self, content_id: Snowflake) -> i64 {
        self.state().view_rows(content_id)
    }

    pub fn like_rows(&self, content_id: Snowflake) -> i64 {
        self.state().like_rows(content_id)
    }

    /// Every operation fails with `StoreUnavailable` while set
    pub fn set_store_down(&self, down: bool) {
        self.faults.store_down.store(down, Ordering::SeqCst);
    }

    /// Every counter write fails while set; fact writes that carry a
    /// counter step fail with it and leave no row behind
    pub fn set_counters_down(&self, down: bool) {
        self.faults.counters_down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentRepository for InMemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Content>> {
        self.enter().await?;
        Ok(self.state().contents.get(&id).cloned())
    }

    async fn create(&self, content: &Content) -> RepoResult<()> {
        self.enter().await?;
        let mut state = self.state();
        if !state.users.contains(&content.owner_id) {
            return Err(DomainError::UserNotFound(content.owner_id));
        }
        if !state.categories.contains(&content.category_id) {
            return Err(DomainError::CategoryNotFound(content.category_id));
        }
        state.contents.insert(content.id, content.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        self.enter().await?;
        let mut state = self.state();
        if state.contents.remove(&id).is_none() {
            return Ok(false);
        }
        state.views.retain(|(content_id, _, _), _| *content_id != id);
        state.likes.retain(|(content_id, _), _| *content_id != id);
        Ok(true)
    }

    async fn random_per_category(&self, status: ContentStatus) -> RepoResult<Vec<Content>> {
        self.enter().await?;
        let state = self.state();
        let mut by_category: BTreeMap<Snowflake, Vec<&Content>> = BTreeMap::new();
        for content in state.contents.values().filter(|c| c.status == status) {
            by_category.entry(content.category_id).or_default().push(content);
        }

        let mut rng = rand::thread_rng();
        Ok(by_category
            .values()
            .filter_map(|items| items.choose(&mut rng).map(|c| (*c).clone()))
            .collect())
    }

    async fn random_in_category(
        &self,
        category_id: Snowflake,
        status: ContentStatus,
    ) -> RepoResult<Option<Content>> {
        self.enter().await?;
        let state = self.state();
        let items: Vec<&Content> = state
            .contents
            .values()
            .filter(|c| c.category_id == category_id && c.status == status)
            .collect();
        Ok(items.choose(&mut rand::thread_rng()).map(|c| (*c).clone()))
    }

    async fn ids_after(&self, cursor: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Snowflake>> {
        self.enter().await?;
        let floor = cursor.unwrap_or(Snowflake::new(0));
        let limit = limit.clamp(1, 10_000) as usize;
        Ok(self
            .state()
            .contents
            .keys()
            .filter(|id| **id > floor)
            .take(limit)
            .copied()
            .collect())
    }
}

#[async_trait]
impl ViewRepository for InMemoryStore {
    async fn record(&self, record: &ViewRecord) -> RepoResult<Option<i64>> {
        self.enter().await?;
        self.check_counters()?;
        let mut state = self.state();
        let key = (
            record.content_id,
            record.identity.storage_key(),
            record.bucket,
        );
        let duplicate = state.views.contains_key(&key);
        let content = state.content_mut(record.content_id)?;
        if duplicate {
            return Ok(None);
        }
        content.view_count += 1;
        let view_count = content.view_count;
        state.views.insert(key, record.viewed_at);
        Ok(Some(view_count))
    }

    async fn prune_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        self.enter().await?;
        let mut state = self.state();
        let before = state.views.len();
        state.views.retain(|_, viewed_at| *viewed_at >= cutoff);
        Ok((before - state.views.len()) as u64)
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn toggle(&self, record: &LikeRecord) -> RepoResult<LikeOutcome> {
        self.enter().await?;
        self.check_counters()?;
        let mut state = self.state();
        state.content_mut(record.content_id)?;

        let key = (record.content_id, record.user_id);
        let liked = if state.likes.remove(&key).is_some() {
            false
        } else {
            if !state.users.contains(&record.user_id) {
                return Err(DomainError::UserNotFound(record.user_id));
            }
            state.likes.insert(key, record.created_at);
            true
        };

        let content = state.content_mut(record.content_id)?;
        let step = if liked { 1 } else { -1 };
        content.like_count = (content.like_count + step).max(0);
        Ok(LikeOutcome {
            liked,
            like_count: content.like_count,
        })
    }

    async fn exists(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        self.enter().await?;
        Ok(self.state().likes.contains_key(&(content_id, user_id)))
    }
}

#[async_trait]
impl CounterRepository for InMemoryStore {
    async fn adjust(
        &self,
        content_id: Snowflake,
        field: CounterField,
        delta: CounterDelta,
    ) -> RepoResult<i64> {
        self.enter().await?;
        self.check_counters()?;
        let mut state = self.state();
        let content = state.content_mut(content_id)?;
        let slot = match field {
            CounterField::ViewCount => &mut content.view_count,
            CounterField::LikeCount => &mut content.like_count,
        };
        *slot = (*slot + delta.as_i64()).max(0);
        Ok(*slot)
    }

    async fn get(&self, content_id: Snowflake) -> RepoResult<Counters> {
        self.enter().await?;
        self.state()
            .contents
            .get(&content_id)
            .map(Content::counters)
            .ok_or(DomainError::ContentNotFound(content_id))
    }

    async fn reconcile(&self, content_id: Snowflake) -> RepoResult<Reconciliation> {
        self.enter().await?;
        let mut state = self.state();
        let recomputed = Counters::new(state.view_rows(content_id), state.like_rows(content_id));
        let content = state.content_mut(content_id)?;
        let stored = content.counters();
        content.view_count = recomputed.view_count;
        content.like_count = recomputed.like_count;
        Ok(Reconciliation {
            content_id,
            stored,
            recomputed,
        })
    }
}

/// Owner of every [`sample_content`] item
pub const SAMPLE_OWNER: Snowflake = Snowflake::new(1);

/// Published content with zeroed counters
pub fn sample_content(id: i64, category_id: i64) -> Content {
    Content::new(
        Snowflake::new(id),
        SAMPLE_OWNER,
        Snowflake::new(category_id),
        format!("Content {id}"),
        ContentStatus::Published,
    )
}

/// Discovery cache whose every call fails, as when Redis is unreachable
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableCache;

#[async_trait]
impl DiscoveryCache for UnavailableCache {
    async fn get(&self, _key: &DiscoveryKey) -> RepoResult<Option<DiscoverySelection>> {
        Err(DomainError::CacheUnavailable("connection refused".to_string()))
    }

    async fn put(
        &self,
        _key: &DiscoveryKey,
        _selection: &DiscoverySelection,
        _ttl: Duration,
    ) -> RepoResult<()> {
        Err(DomainError::CacheUnavailable("connection refused".to_string()))
    }
}

/// Context with every repository backed by `store`
pub fn context(
    store: &InMemoryStore,
    cache: Arc<dyn DiscoveryCache>,
    engagement: EngagementConfig,
) -> ServiceContext {
    let store = Arc::new(store.clone());
    let built = ServiceContext::builder()
        .content_repo(store.clone())
        .view_repo(store.clone())
        .like_repo(store.clone())
        .counter_repo(store)
        .discovery_cache(cache)
        .jwt_service(Arc::new(JwtService::new(TEST_JWT_SECRET, 900)))
        .engagement(engagement)
        .build();

    match built {
        Ok(ctx) => ctx,
        Err(e) => unreachable!("all ports are provided: {e}"),
    }
}
