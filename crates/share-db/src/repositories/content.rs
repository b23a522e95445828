//! PostgreSQL implementation of ContentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use share_core::entities::{Content, ContentStatus};
use share_core::error::DomainError;
use share_core::traits::{ContentRepository, RepoResult};
use share_core::value_objects::Snowflake;

use crate::mappers::ContentInsert;
use crate::models::ContentModel;

use super::error::{map_db_error, map_fk_violation};

const CONTENT_COLUMNS: &str = "id, owner_id, category_id, title, media_url, status, \
                               view_count, like_count, created_at, updated_at";

/// PostgreSQL implementation of ContentRepository
#[derive(Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_entities(models: Vec<ContentModel>) -> RepoResult<Vec<Content>> {
    models.into_iter().map(Content::try_from).collect()
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Content>> {
        let query = format!("SELECT {CONTENT_COLUMNS} FROM contents WHERE id = $1");
        let result = sqlx::query_as::<_, ContentModel>(&query)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Content::try_from).transpose()
    }

    #[instrument(skip(self, content), fields(content_id = %content.id))]
    async fn create(&self, content: &Content) -> RepoResult<()> {
        let insert = ContentInsert::new(content);

        sqlx::query(
            r#"
            INSERT INTO contents (id, owner_id, category_id, title, media_url, status,
                                  view_count, like_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, 0, $7, $8)
            "#,
        )
        .bind(insert.id)
        .bind(insert.owner_id)
        .bind(insert.category_id)
        .bind(insert.title)
        .bind(insert.media_url)
        .bind(insert.status)
        .bind(content.created_at)
        .bind(content.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_fk_violation(e, |constraint| match constraint {
                "contents_owner_id_fkey" => Some(DomainError::UserNotFound(content.owner_id)),
                "contents_category_id_fkey" => {
                    Some(DomainError::CategoryNotFound(content.category_id))
                }
                _ => None,
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM contents WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn random_per_category(&self, status: ContentStatus) -> RepoResult<Vec<Content>> {
        let query = format!(
            "SELECT DISTINCT ON (category_id) {CONTENT_COLUMNS} FROM contents \
             WHERE status = $1 ORDER BY category_id, random()"
        );
        let results = sqlx::query_as::<_, ContentModel>(&query)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_entities(results)
    }

    #[instrument(skip(self))]
    async fn random_in_category(
        &self,
        category_id: Snowflake,
        status: ContentStatus,
    ) -> RepoResult<Option<Content>> {
        let query = format!(
            "SELECT {CONTENT_COLUMNS} FROM contents \
             WHERE category_id = $1 AND status = $2 ORDER BY random() LIMIT 1"
        );
        let result = sqlx::query_as::<_, ContentModel>(&query)
            .bind(category_id.into_inner())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Content::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn ids_after(&self, cursor: Option<Snowflake>, limit: i64) -> RepoResult<Vec<Snowflake>> {
        let limit = limit.clamp(1, 10_000);

        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM contents
            WHERE id > $1
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(cursor.map_or(0, Snowflake::into_inner))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgContentRepository>();
    }
}
