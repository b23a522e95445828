//! Cache port for discovery selections

use std::time::Duration;

use async_trait::async_trait;

use crate::entities::{DiscoveryKey, DiscoverySelection};
use crate::traits::RepoResult;

/// Time-bounded store of discovery selections
///
/// Entries are never a source of truth. Implementations report backend
/// failures as `DomainError::CacheUnavailable`.
#[async_trait]
pub trait DiscoveryCache: Send + Sync {
    /// Non-expired selection for `key`, if any
    async fn get(&self, key: &DiscoveryKey) -> RepoResult<Option<DiscoverySelection>>;

    /// Store `selection` under `key`, replacing any previous entry
    async fn put(
        &self,
        key: &DiscoveryKey,
        selection: &DiscoverySelection,
        ttl: Duration,
    ) -> RepoResult<()>;
}
