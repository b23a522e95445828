//! Content service
//!
//! The slice of content management the engagement layer depends on:
//! lookup, creation, and owner-only deletion. Deleting content removes its
//! view and like records with it.

use share_core::entities::Content;
use share_core::Snowflake;
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::CreateContentRequest;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Content service
pub struct ContentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ContentService<'a> {
    /// Create a new ContentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get content by ID
    #[instrument(skip(self))]
    pub async fn get_content(&self, content_id: Snowflake) -> ServiceResult<Content> {
        self.ctx
            .content_repo()
            .find_by_id(content_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Content", content_id))
    }

    /// Create content owned by `owner_id` with zeroed counters
    #[instrument(skip(self, request), fields(category_id = %request.category_id))]
    pub async fn create_content(
        &self,
        owner_id: Snowflake,
        request: CreateContentRequest,
    ) -> ServiceResult<Content> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let mut content = Content::new(
            self.ctx.generate_id(),
            owner_id,
            request.category_id,
            request.title.trim(),
            request.status,
        );
        content.media_url = request.media_url;

        self.ctx.content_repo().create(&content).await?;

        info!(content_id = %content.id, owner_id = %owner_id, "Content created");

        Ok(content)
    }

    /// Delete content; only its owner may do so
    #[instrument(skip(self))]
    pub async fn delete_content(
        &self,
        content_id: Snowflake,
        requester_id: Snowflake,
    ) -> ServiceResult<()> {
        let content = self.get_content(content_id).await?;
        if !content.is_owned_by(requester_id) {
            return Err(ServiceError::permission_denied(
                "Only the owner can delete this content",
            ));
        }

        if !self.ctx.content_repo().delete(content_id).await? {
            return Err(ServiceError::not_found("Content", content_id));
        }

        info!(content_id = %content_id, "Content deleted");

        Ok(())
    }
}
