//! PostgreSQL implementation of ViewRepository
//!
//! A view row and its `view_count` step are one statement: a reconcile that
//! holds the content row lock sees either both or neither.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use share_core::entities::ViewRecord;
use share_core::error::DomainError;
use share_core::traits::{RepoResult, ViewRepository};

use crate::mappers::ViewInsert;

use super::error::{map_db_error, map_fk_violation};

/// PostgreSQL implementation of ViewRepository
#[derive(Clone)]
pub struct PgViewRepository {
    pool: PgPool,
}

impl PgViewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViewRepository for PgViewRepository {
    #[instrument(skip(self, record), fields(content_id = %record.content_id, bucket = record.bucket))]
    async fn record(&self, record: &ViewRecord) -> RepoResult<Option<i64>> {
        let insert = ViewInsert::new(record);

        // The counter row is joined on the inserted row, so a duplicate
        // updates nothing and returns no row
        sqlx::query_scalar::<_, i64>(
            r#"
            WITH inserted AS (
                INSERT INTO content_views (content_id, identity_key, identity_kind, bucket, viewed_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (content_id, identity_key, bucket) DO NOTHING
                RETURNING content_id
            )
            UPDATE contents SET view_count = contents.view_count + 1
            FROM inserted
            WHERE contents.id = inserted.content_id
            RETURNING contents.view_count
            "#,
        )
        .bind(insert.content_id)
        .bind(&insert.identity_key)
        .bind(insert.identity_kind)
        .bind(insert.bucket)
        .bind(insert.viewed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            map_fk_violation(e, |constraint| {
                (constraint == "content_views_content_id_fkey")
                    .then_some(DomainError::ContentNotFound(record.content_id))
            })
        })
    }

    #[instrument(skip(self))]
    async fn prune_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM content_views WHERE viewed_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
