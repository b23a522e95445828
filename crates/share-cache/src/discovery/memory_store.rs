//! In-process discovery cache
//!
//! Used when `DISCOVERY_CACHE_BACKEND=memory` (single-instance deployments)
//! and in tests. Expired entries are dropped lazily on read and swept on
//! every write.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use share_core::entities::{DiscoveryKey, DiscoverySelection};
use share_core::traits::{DiscoveryCache, RepoResult};

#[derive(Debug, Clone)]
struct Entry {
    selection: DiscoverySelection,
    expires_at: Instant,
}

/// DashMap-backed discovery cache
#[derive(Debug, Clone, Default)]
pub struct MemoryDiscoveryCache {
    entries: Arc<DashMap<DiscoveryKey, Entry>>,
}

impl MemoryDiscoveryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl DiscoveryCache for MemoryDiscoveryCache {
    async fn get(&self, key: &DiscoveryKey) -> RepoResult<Option<DiscoverySelection>> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.selection.clone()));
            }
        }

        // The read guard is released above; a concurrent put may have
        // refreshed the entry in between, so only remove it if still stale
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    async fn put(
        &self,
        key: &DiscoveryKey,
        selection: &DiscoverySelection,
        ttl: Duration,
    ) -> RepoResult<()> {
        // One entry per (scope, status); sweeping on write keeps keys that
        // are no longer queried from accumulating
        self.purge_expired();
        self.entries.insert(
            *key,
            Entry {
                selection: selection.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
