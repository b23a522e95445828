//! PostgreSQL implementation of LikeRepository
//!
//! A toggle runs in one transaction under the content row lock, so toggles
//! for a content item apply one after another and `like_count` always
//! moves with the row it counts.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use share_core::entities::{LikeOutcome, LikeRecord};
use share_core::error::DomainError;
use share_core::traits::{LikeRepository, RepoResult};
use share_core::value_objects::Snowflake;

use crate::mappers::LikeInsert;

use super::error::{map_db_error, map_fk_violation};

/// PostgreSQL implementation of LikeRepository
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    #[instrument(skip(self, record), fields(content_id = %record.content_id, user_id = %record.user_id))]
    async fn toggle(&self, record: &LikeRecord) -> RepoResult<LikeOutcome> {
        let insert = LikeInsert::new(record);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Toggles on this content queue here until we commit
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM contents WHERE id = $1 FOR NO KEY UPDATE
            "#,
        )
        .bind(insert.content_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::ContentNotFound(record.content_id))?;

        let removed = sqlx::query(
            r#"
            DELETE FROM content_likes WHERE content_id = $1 AND user_id = $2
            "#,
        )
        .bind(insert.content_id)
        .bind(insert.user_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        let (liked, delta) = if removed > 0 {
            (false, -1_i64)
        } else {
            let inserted = sqlx::query(
                r#"
                INSERT INTO content_likes (content_id, user_id, created_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (content_id, user_id) DO NOTHING
                "#,
            )
            .bind(insert.content_id)
            .bind(insert.user_id)
            .bind(insert.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                map_fk_violation(e, |constraint| {
                    (constraint == "content_likes_user_id_fkey")
                        .then_some(DomainError::UserNotFound(record.user_id))
                })
            })?
            .rows_affected();
            (true, i64::from(inserted > 0))
        };

        // Clamped only if the stored value already drifted below the rows
        let like_count = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE contents SET like_count = GREATEST(like_count + $2, 0)
            WHERE id = $1
            RETURNING like_count
            "#,
        )
        .bind(insert.content_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(liked, like_count, "Like toggled");

        Ok(LikeOutcome { liked, like_count })
    }

    #[instrument(skip(self))]
    async fn exists(&self, content_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM content_likes WHERE content_id = $1 AND user_id = $2)
            "#,
        )
        .bind(content_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
