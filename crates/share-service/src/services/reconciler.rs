//! Background counter maintenance
//!
//! Periodically prunes expired view records (when a retention horizon is
//! configured) and then reconciles every content item's counters. Failures
//! are logged and the next tick tries again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::dto::{PruneReport, ReconcileSummary};

use super::context::ServiceContext;
use super::counter::CounterService;
use super::view::ViewService;

/// Outcome of one maintenance pass
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintenancePass {
    pub pruned: Option<PruneReport>,
    pub summary: Option<ReconcileSummary>,
}

/// Spawn the maintenance loop if `RECONCILE_INTERVAL_SECS` enables it
pub fn spawn_reconciler(ctx: Arc<ServiceContext>) -> Option<JoinHandle<()>> {
    let period = ctx.engagement().reconcile_interval()?;

    info!(
        interval_secs = period.as_secs(),
        batch_size = ctx.engagement().reconcile_batch_size,
        "Background reconciler started"
    );

    Some(tokio::spawn(run(ctx, period)))
}

async fn run(ctx: Arc<ServiceContext>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; start one full period in
    ticker.tick().await;

    loop {
        ticker.tick().await;
        run_once(&ctx).await;
    }
}

/// One prune-then-reconcile pass
pub async fn run_once(ctx: &ServiceContext) -> MaintenancePass {
    let mut pass = MaintenancePass::default();

    if let Some(retention) = ctx.engagement().view_retention() {
        match ViewService::new(ctx).prune_views(retention).await {
            Ok(report) => pass.pruned = Some(report),
            Err(e) => warn!(error = %e, "View pruning failed"),
        }
    }

    match CounterService::new(ctx)
        .reconcile_all(ctx.engagement().reconcile_batch_size)
        .await
    {
        Ok(summary) => pass.summary = Some(summary),
        Err(e) => error!(error = %e, "Reconcile sweep failed"),
    }

    pass
}

#[cfg(test)]
mod tests {
    use super::*;

    use share_cache::MemoryDiscoveryCache;
    use share_common::EngagementConfig;
    use share_core::{Counters, Snowflake};

    use crate::testing::{self, InMemoryStore};

    #[tokio::test]
    async fn test_disabled_without_interval() {
        let store = InMemoryStore::new();
        let ctx = testing::context(
            &store,
            Arc::new(MemoryDiscoveryCache::new()),
            EngagementConfig::default(),
        );
        assert!(spawn_reconciler(Arc::new(ctx)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_pass_repairs_drift() {
        let store = InMemoryStore::new();
        store.seed_content(testing::sample_content(1, 1));
        let ctx = testing::context(
            &store,
            Arc::new(MemoryDiscoveryCache::new()),
            EngagementConfig {
                reconcile_interval_secs: 30,
                ..EngagementConfig::default()
            },
        );
        let handle = spawn_reconciler(Arc::new(ctx)).unwrap();

        store.set_counters(Snowflake::new(1), Counters::new(6, 2));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.stored_counters(Snowflake::new(1)), Some(Counters::new(6, 2)));

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(store.stored_counters(Snowflake::new(1)), Some(Counters::new(0, 0)));

        handle.abort();
    }

    #[tokio::test]
    async fn test_pass_skips_pruning_under_permanent_policy() {
        let store = InMemoryStore::new();
        store.seed_content(testing::sample_content(1, 1));
        let ctx = testing::context(
            &store,
            Arc::new(MemoryDiscoveryCache::new()),
            EngagementConfig {
                view_retention_days: Some(30),
                ..EngagementConfig::default()
            },
        );

        let pass = run_once(&ctx).await;

        assert!(pass.pruned.is_none());
        assert_eq!(pass.summary.unwrap().checked, 1);
    }

    #[tokio::test]
    async fn test_pass_prunes_under_cooldown() {
        let store = InMemoryStore::new();
        store.seed_content(testing::sample_content(1, 1));
        let ctx = testing::context(
            &store,
            Arc::new(MemoryDiscoveryCache::new()),
            EngagementConfig {
                view_dedup_window_secs: Some(3600),
                view_retention_days: Some(7),
                ..EngagementConfig::default()
            },
        );

        let pass = run_once(&ctx).await;

        assert_eq!(pass.pruned.unwrap().removed, 0);
        assert!(pass.summary.is_some());
    }

    #[tokio::test]
    async fn test_pass_survives_store_outage() {
        let store = InMemoryStore::new();
        store.seed_content(testing::sample_content(1, 1));
        store.set_store_down(true);
        let ctx = testing::context(
            &store,
            Arc::new(MemoryDiscoveryCache::new()),
            EngagementConfig::default(),
        );

        let pass = run_once(&ctx).await;
        assert!(pass.summary.is_none());
    }
}
