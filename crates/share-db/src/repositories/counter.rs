//! PostgreSQL implementation of CounterRepository
//!
//! Counters are only ever changed by a single `UPDATE` evaluated at the
//! store, so concurrent adjustments never lose increments. View and like
//! writes move their counter in the same statement or transaction as the
//! fact row (see `view.rs`, `like.rs`); `reconcile` takes the content row
//! lock, so it never counts a fact whose counter step is still pending.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use share_core::entities::{CounterDelta, CounterField, Counters, Reconciliation};
use share_core::error::DomainError;
use share_core::traits::{CounterRepository, RepoResult};
use share_core::value_objects::Snowflake;

use crate::models::CountersModel;

use super::error::map_db_error;

/// PostgreSQL implementation of CounterRepository
#[derive(Clone)]
pub struct PgCounterRepository {
    pool: PgPool,
}

impl PgCounterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn adjust_sql(field: CounterField) -> &'static str {
    match field {
        CounterField::ViewCount => {
            r#"
            UPDATE contents SET view_count = GREATEST(view_count + $2, 0)
            WHERE id = $1
            RETURNING view_count
            "#
        }
        CounterField::LikeCount => {
            r#"
            UPDATE contents SET like_count = GREATEST(like_count + $2, 0)
            WHERE id = $1
            RETURNING like_count
            "#
        }
    }
}

#[async_trait]
impl CounterRepository for PgCounterRepository {
    #[instrument(skip(self))]
    async fn adjust(
        &self,
        content_id: Snowflake,
        field: CounterField,
        delta: CounterDelta,
    ) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(adjust_sql(field))
            .bind(content_id.into_inner())
            .bind(delta.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .ok_or(DomainError::ContentNotFound(content_id))
    }

    #[instrument(skip(self))]
    async fn get(&self, content_id: Snowflake) -> RepoResult<Counters> {
        sqlx::query_as::<_, CountersModel>(
            r#"
            SELECT view_count, like_count FROM contents WHERE id = $1
            "#,
        )
        .bind(content_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .map(Counters::from)
        .ok_or(DomainError::ContentNotFound(content_id))
    }

    #[instrument(skip(self))]
    async fn reconcile(&self, content_id: Snowflake) -> RepoResult<Reconciliation> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Row lock first: adjustments for this content queue behind us
        let stored = sqlx::query_as::<_, CountersModel>(
            r#"
            SELECT view_count, like_count FROM contents WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(content_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::ContentNotFound(content_id))?;

        let recomputed = sqlx::query_as::<_, CountersModel>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM content_views WHERE content_id = $1) AS view_count,
                (SELECT COUNT(*) FROM content_likes WHERE content_id = $1) AS like_count
            "#,
        )
        .bind(content_id.into_inner())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r#"
            UPDATE contents SET view_count = $2, like_count = $3 WHERE id = $1
            "#,
        )
        .bind(content_id.into_inner())
        .bind(recomputed.view_count)
        .bind(recomputed.like_count)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(?stored, ?recomputed, "Counters recomputed");

        Ok(Reconciliation {
            content_id,
            stored: stored.into(),
            recomputed: recomputed.into(),
        })
    }
}
