//! View service
//!
//! Counts a view at most once per (content, viewer identity, dedup bucket).
//! The view ledger insert is the dedup decision, and the store bumps the
//! counter in the same write only when that insert created a row.

use chrono::{DateTime, Duration, Utc};
use share_core::entities::{ViewOutcome, ViewRecord};
use share_core::identity::{resolve_identity, RequestSignals, ViewerIdentity};
use share_core::{DomainError, Snowflake};
use tracing::{debug, info, instrument};

use crate::dto::PruneReport;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// View service
pub struct ViewService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ViewService<'a> {
    /// Create a new ViewService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve the viewer from request signals and record the view
    #[instrument(skip(self, signals))]
    pub async fn record_view(
        &self,
        content_id: Snowflake,
        signals: &RequestSignals,
    ) -> ServiceResult<ViewOutcome> {
        self.record_view_as(content_id, resolve_identity(signals))
            .await
    }

    /// Record a view for an already resolved identity.
    ///
    /// Without an identity nothing is written and the current count is
    /// returned with `counted: false`.
    #[instrument(skip(self), fields(identity = identity.as_ref().map(|i| i.kind.as_str())))]
    pub async fn record_view_as(
        &self,
        content_id: Snowflake,
        identity: Option<ViewerIdentity>,
    ) -> ServiceResult<ViewOutcome> {
        self.record_at(content_id, identity, Utc::now()).await
    }

    async fn record_at(
        &self,
        content_id: Snowflake,
        identity: Option<ViewerIdentity>,
        at: DateTime<Utc>,
    ) -> ServiceResult<ViewOutcome> {
        let Some(identity) = identity else {
            debug!(content_id = %content_id, "No viewer identity, view not counted");
            return self.current(content_id).await;
        };

        let record = ViewRecord::capture_at(content_id, identity, self.ctx.dedup_policy(), at);
        let Some(view_count) = self.ctx.view_repo().record(&record).await? else {
            debug!(content_id = %content_id, bucket = record.bucket, "Duplicate view ignored");
            return self.current(content_id).await;
        };

        info!(
            content_id = %content_id,
            viewer = %record.identity.kind,
            view_count,
            "View counted"
        );

        Ok(ViewOutcome::counted(view_count))
    }

    /// Delete view records older than `older_than`.
    ///
    /// Only allowed under the cooldown policy, and never with a horizon
    /// shorter than the dedup window: under the permanent policy the rows are
    /// the only memory of who has viewed.
    #[instrument(skip(self))]
    pub async fn prune_views(&self, older_than: Duration) -> ServiceResult<PruneReport> {
        let policy = self.ctx.dedup_policy();
        if !policy.allows_pruning() {
            return Err(DomainError::PruningDisabled.into());
        }
        if let Some(window) = policy.window() {
            if older_than < window {
                return Err(ServiceError::validation(format!(
                    "Retention horizon must be at least the dedup window ({policy})"
                )));
            }
        }

        let cutoff = Utc::now() - older_than;
        let removed = self.ctx.view_repo().prune_before(cutoff).await?;

        info!(removed, cutoff = %cutoff, "Pruned view records");

        Ok(PruneReport { removed, cutoff })
    }

    async fn current(&self, content_id: Snowflake) -> ServiceResult<ViewOutcome> {
        let counters = self.ctx.counter_repo().get(content_id).await?;
        Ok(ViewOutcome::ignored(counters.view_count))
    }
}
