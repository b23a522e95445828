//! Counter service
//!
//! Denormalized `view_count`/`like_count` maintenance: single-step atomic
//! adjustments, and reconciliation against the fact tables to repair drift
//! from writes that bypass them (manual fixes, cascaded user deletes,
//! pruned view records).

use share_core::entities::{CounterDelta, CounterField, Counters};
use share_core::{DomainError, Snowflake};
use tracing::{debug, info, instrument, warn};

use crate::dto::{ReconcileReport, ReconcileSummary};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Counter service
pub struct CounterService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CounterService<'a> {
    /// Create a new CounterService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Apply one atomic step to a counter; returns the new value
    #[instrument(skip(self))]
    pub async fn adjust(
        &self,
        content_id: Snowflake,
        field: CounterField,
        delta: CounterDelta,
    ) -> ServiceResult<i64> {
        Ok(self.ctx.counter_repo().adjust(content_id, field, delta).await?)
    }

    #[instrument(skip(self))]
    pub async fn counters(&self, content_id: Snowflake) -> ServiceResult<Counters> {
        Ok(self.ctx.counter_repo().get(content_id).await?)
    }

    /// Recompute both counters from the fact tables and overwrite them
    #[instrument(skip(self))]
    pub async fn reconcile(&self, content_id: Snowflake) -> ServiceResult<ReconcileReport> {
        let reconciliation = self.ctx.counter_repo().reconcile(content_id).await?;
        let report = ReconcileReport::new(reconciliation, self.ctx.drift_tolerance());

        if let Some(drift) = report.drift {
            warn!(
                content_id = %content_id,
                view_delta = drift.view_delta,
                like_delta = drift.like_delta,
                "Counter drift repaired"
            );
        } else {
            debug!(content_id = %content_id, "Counters consistent");
        }

        info!(
            content_id = %content_id,
            view_count = report.view_count,
            like_count = report.like_count,
            "Counters reconciled"
        );

        Ok(report)
    }

    /// Reconcile every content item, `batch_size` ids at a time.
    ///
    /// Items deleted mid-sweep are skipped. Other per-item failures are
    /// counted and the sweep continues; a failure to list ids aborts it.
    #[instrument(skip(self))]
    pub async fn reconcile_all(&self, batch_size: u32) -> ServiceResult<ReconcileSummary> {
        if batch_size == 0 {
            return Err(ServiceError::validation("Batch size must be positive"));
        }

        let mut summary = ReconcileSummary::default();
        let mut cursor = None;

        loop {
            let ids = self
                .ctx
                .content_repo()
                .ids_after(cursor, i64::from(batch_size))
                .await?;
            let Some(last) = ids.last().copied() else {
                break;
            };

            for id in ids {
                match self.reconcile(id).await {
                    Ok(report) => {
                        summary.checked += 1;
                        if report.drift.is_some() {
                            summary.drifted += 1;
                        }
                    }
                    Err(ServiceError::Domain(DomainError::ContentNotFound(_))) => {
                        debug!(content_id = %id, "Content deleted during sweep");
                    }
                    Err(e) => {
                        warn!(content_id = %id, error = %e, "Reconcile failed");
                        summary.failed += 1;
                    }
                }
            }

            cursor = Some(last);
        }

        info!(
            checked = summary.checked,
            drifted = summary.drifted,
            failed = summary.failed,
            "Reconcile sweep finished"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use share_cache::MemoryDiscoveryCache;
    use share_common::EngagementConfig;
    use share_core::identity::{IdentityKind, ViewerIdentity};

    use crate::services::{LikeService, ViewService};
    use crate::testing::{self, InMemoryStore};

    fn setup(items: &[i64]) -> (InMemoryStore, ServiceContext) {
        let store = InMemoryStore::new();
        for id in items {
            store.seed_content(testing::sample_content(*id, 1));
        }
        let ctx = testing::context(
            &store,
            Arc::new(MemoryDiscoveryCache::new()),
            EngagementConfig::default(),
        );
        (store, ctx)
    }

    async fn view(ctx: &ServiceContext, content: Snowflake, key: &str) {
        ViewService::new(ctx)
            .record_view_as(content, Some(ViewerIdentity::new(IdentityKind::Session, key)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_adjust_clamps_at_zero() {
        let (_, ctx) = setup(&[1]);
        let service = CounterService::new(&ctx);
        let id = Snowflake::new(1);

        let value = service
            .adjust(id, CounterField::LikeCount, CounterDelta::Decrement)
            .await
            .unwrap();
        assert_eq!(value, 0);

        let value = service
            .adjust(id, CounterField::ViewCount, CounterDelta::Increment)
            .await
            .unwrap();
        assert_eq!(value, 1);
        assert_eq!(service.counters(id).await.unwrap(), Counters::new(1, 0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adjustments_are_not_lost() {
        let (store, ctx) = setup(&[1]);
        let id = Snowflake::new(1);

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    CounterService::new(&ctx)
                        .adjust(id, CounterField::ViewCount, CounterDelta::Increment)
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.stored_counters(id).unwrap().view_count, 50);
    }

    #[tokio::test]
    async fn test_reconcile_repairs_and_reports_drift() {
        let (store, ctx) = setup(&[1]);
        let id = Snowflake::new(1);
        view(&ctx, id, "a").await;
        view(&ctx, id, "b").await;
        store.add_user(Snowflake::new(50));
        LikeService::new(&ctx)
            .toggle_like(id, Snowflake::new(50))
            .await
            .unwrap();

        store.set_counters(id, Counters::new(9, 0));
        let report = CounterService::new(&ctx).reconcile(id).await.unwrap();

        assert_eq!(report.view_count, 2);
        assert_eq!(report.like_count, 1);
        let drift = report.drift.unwrap();
        assert_eq!(drift.view_delta, -7);
        assert_eq!(drift.like_delta, 1);
        assert_eq!(store.stored_counters(id).unwrap(), Counters::new(2, 1));
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let (store, ctx) = setup(&[1]);
        let id = Snowflake::new(1);
        view(&ctx, id, "a").await;
        store.set_counters(id, Counters::new(0, 3));

        let service = CounterService::new(&ctx);
        let first = service.reconcile(id).await.unwrap();
        let second = service.reconcile(id).await.unwrap();

        assert!(first.drift.is_some());
        assert!(second.drift.is_none());
        assert_eq!(
            (first.view_count, first.like_count),
            (second.view_count, second.like_count)
        );
    }

    #[tokio::test]
    async fn test_reconcile_undoes_stray_adjustment() {
        let (store, ctx) = setup(&[1]);
        let id = Snowflake::new(1);
        let service = CounterService::new(&ctx);

        view(&ctx, id, "a").await;
        service
            .adjust(id, CounterField::ViewCount, CounterDelta::Increment)
            .await
            .unwrap();
        assert_eq!(store.stored_counters(id).unwrap().view_count, 2);

        let report = service.reconcile(id).await.unwrap();
        assert_eq!(report.view_count, 1);
        assert_eq!(report.drift.map(|d| d.view_delta), Some(-1));
    }

    #[tokio::test]
    async fn test_reconcile_report_hides_drift_within_tolerance() {
        let store = InMemoryStore::new();
        store.seed_content(testing::sample_content(1, 1));
        let ctx = testing::context(
            &store,
            Arc::new(MemoryDiscoveryCache::new()),
            EngagementConfig {
                counter_drift_tolerance: 2,
                ..EngagementConfig::default()
            },
        );
        let id = Snowflake::new(1);

        store.set_counters(id, Counters::new(2, 0));
        let report = CounterService::new(&ctx).reconcile(id).await.unwrap();
        assert!(report.drift.is_none());
        assert_eq!(store.stored_counters(id), Some(Counters::new(0, 0)));

        store.set_counters(id, Counters::new(5, 0));
        let report = CounterService::new(&ctx).reconcile(id).await.unwrap();
        assert_eq!(report.drift.map(|d| d.view_delta), Some(-5));
    }

    #[tokio::test]
    async fn test_reconcile_unknown_content() {
        let (_, ctx) = setup(&[]);
        let err = CounterService::new(&ctx)
            .reconcile(Snowflake::new(77))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_reconcile_all_walks_every_batch() {
        let (store, ctx) = setup(&[1, 2, 3, 4, 5]);
        store.set_counters(Snowflake::new(2), Counters::new(4, 0));
        store.set_counters(Snowflake::new(5), Counters::new(0, 2));

        let summary = CounterService::new(&ctx).reconcile_all(2).await.unwrap();

        assert_eq!(summary.checked, 5);
        assert_eq!(summary.drifted, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(store.stored_counters(Snowflake::new(2)), Some(Counters::new(0, 0)));
    }

    #[tokio::test]
    async fn test_reconcile_all_respects_tolerance() {
        let store = InMemoryStore::new();
        store.seed_content(testing::sample_content(1, 1));
        let ctx = testing::context(
            &store,
            Arc::new(MemoryDiscoveryCache::new()),
            EngagementConfig {
                counter_drift_tolerance: 2,
                ..EngagementConfig::default()
            },
        );
        store.set_counters(Snowflake::new(1), Counters::new(1, 0));

        let summary = CounterService::new(&ctx).reconcile_all(10).await.unwrap();

        assert_eq!(summary.checked, 1);
        assert_eq!(summary.drifted, 0);
        // Still repaired, only not counted as drift
        assert_eq!(store.stored_counters(Snowflake::new(1)), Some(Counters::new(0, 0)));
    }

    #[tokio::test]
    async fn test_reconcile_all_rejects_zero_batch() {
        let (_, ctx) = setup(&[1]);
        let err = CounterService::new(&ctx).reconcile_all(0).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
