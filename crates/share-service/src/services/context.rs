//! Service context - dependency container for services
//!
//! Holds the engagement repositories, the discovery cache, and the settings
//! the services read on every call.

use std::sync::Arc;
use std::time::Duration;

use share_cache::SharedRedisPool;
use share_common::auth::JwtService;
use share_common::EngagementConfig;
use share_core::traits::{
    ContentRepository, CounterRepository, DiscoveryCache, LikeRepository, ViewRepository,
};
use share_core::{Snowflake, SnowflakeGenerator, ViewDedupPolicy};
use share_db::{
    PgContentRepository, PgCounterRepository, PgLikeRepository, PgPool, PgViewRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// The pools are optional: they are only used for readiness probes, and
/// contexts wired to in-memory ports have none.
#[derive(Clone)]
pub struct ServiceContext {
    pool: Option<PgPool>,
    redis_pool: Option<SharedRedisPool>,

    // Repositories
    content_repo: Arc<dyn ContentRepository>,
    view_repo: Arc<dyn ViewRepository>,
    like_repo: Arc<dyn LikeRepository>,
    counter_repo: Arc<dyn CounterRepository>,

    // Cache
    discovery_cache: Arc<dyn DiscoveryCache>,

    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    engagement: EngagementConfig,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // ========================================================================
    // Pool accessors
    // ========================================================================

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    pub fn redis_pool(&self) -> Option<&SharedRedisPool> {
        self.redis_pool.as_ref()
    }

    // ========================================================================
    // Repository accessors
    // ========================================================================

    pub fn content_repo(&self) -> &dyn ContentRepository {
        self.content_repo.as_ref()
    }

    pub fn view_repo(&self) -> &dyn ViewRepository {
        self.view_repo.as_ref()
    }

    pub fn like_repo(&self) -> &dyn LikeRepository {
        self.like_repo.as_ref()
    }

    pub fn counter_repo(&self) -> &dyn CounterRepository {
        self.counter_repo.as_ref()
    }

    pub fn discovery_cache(&self) -> &dyn DiscoveryCache {
        self.discovery_cache.as_ref()
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn engagement(&self) -> &EngagementConfig {
        &self.engagement
    }

    pub fn dedup_policy(&self) -> ViewDedupPolicy {
        self.engagement.dedup_policy()
    }

    pub fn discovery_ttl(&self) -> Duration {
        self.engagement.discovery_ttl()
    }

    pub fn drift_tolerance(&self) -> i64 {
        i64::from(self.engagement.counter_drift_tolerance)
    }

    /// Generate a new unique Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.is_some())
            .field("redis_pool", &self.redis_pool.is_some())
            .field("repositories", &"...")
            .field("discovery_cache", &"...")
            .field("engagement", &self.engagement)
            .finish()
    }
}

/// Builder for ServiceContext
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    redis_pool: Option<SharedRedisPool>,
    content_repo: Option<Arc<dyn ContentRepository>>,
    view_repo: Option<Arc<dyn ViewRepository>>,
    like_repo: Option<Arc<dyn LikeRepository>>,
    counter_repo: Option<Arc<dyn CounterRepository>>,
    discovery_cache: Option<Arc<dyn DiscoveryCache>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    engagement: EngagementConfig,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            pool: None,
            redis_pool: None,
            content_repo: None,
            view_repo: None,
            like_repo: None,
            counter_repo: None,
            discovery_cache: None,
            jwt_service: None,
            snowflake_generator: None,
            engagement: EngagementConfig::default(),
        }
    }

    /// Wire every repository to PostgreSQL and keep the pool for probes
    pub fn postgres(mut self, pool: PgPool) -> Self {
        self.content_repo = Some(Arc::new(PgContentRepository::new(pool.clone())));
        self.view_repo = Some(Arc::new(PgViewRepository::new(pool.clone())));
        self.like_repo = Some(Arc::new(PgLikeRepository::new(pool.clone())));
        self.counter_repo = Some(Arc::new(PgCounterRepository::new(pool.clone())));
        self.pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, redis_pool: SharedRedisPool) -> Self {
        self.redis_pool = Some(redis_pool);
        self
    }

    pub fn content_repo(mut self, repo: Arc<dyn ContentRepository>) -> Self {
        self.content_repo = Some(repo);
        self
    }

    pub fn view_repo(mut self, repo: Arc<dyn ViewRepository>) -> Self {
        self.view_repo = Some(repo);
        self
    }

    pub fn like_repo(mut self, repo: Arc<dyn LikeRepository>) -> Self {
        self.like_repo = Some(repo);
        self
    }

    pub fn counter_repo(mut self, repo: Arc<dyn CounterRepository>) -> Self {
        self.counter_repo = Some(repo);
        self
    }

    pub fn discovery_cache(mut self, cache: Arc<dyn DiscoveryCache>) -> Self {
        self.discovery_cache = Some(cache);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn engagement(mut self, engagement: EngagementConfig) -> Self {
        self.engagement = engagement;
        self
    }

    /// Build the context; every repository, the cache, and the JWT service
    /// are required
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            pool: self.pool,
            redis_pool: self.redis_pool,
            content_repo: self
                .content_repo
                .ok_or_else(|| ServiceError::validation("content_repo is required"))?,
            view_repo: self
                .view_repo
                .ok_or_else(|| ServiceError::validation("view_repo is required"))?,
            like_repo: self
                .like_repo
                .ok_or_else(|| ServiceError::validation("like_repo is required"))?,
            counter_repo: self
                .counter_repo
                .ok_or_else(|| ServiceError::validation("counter_repo is required"))?,
            discovery_cache: self
                .discovery_cache
                .ok_or_else(|| ServiceError::validation("discovery_cache is required"))?,
            jwt_service: self
                .jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            snowflake_generator: self.snowflake_generator.unwrap_or_default(),
            engagement: self.engagement,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_repositories() {
        let err = ServiceContext::builder().build().unwrap_err();
        assert!(err.to_string().contains("content_repo is required"));
    }
}
