//! Like service
//!
//! Toggles a user's like. The store applies delete-if-present, else
//! insert-if-absent, together with the matching `like_count` step as one
//! unit, and toggles for the same content apply one after another. N
//! concurrent toggles therefore leave a row exactly when N is odd.

use share_core::entities::{LikeOutcome, LikeRecord};
use share_core::Snowflake;
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Like service
pub struct LikeService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LikeService<'a> {
    /// Create a new LikeService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Flip the like state of (content, user); `liked` is the state after
    /// this call
    #[instrument(skip(self))]
    pub async fn toggle_like(
        &self,
        content_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<LikeOutcome> {
        let outcome = self
            .ctx
            .like_repo()
            .toggle(&LikeRecord::new(content_id, user_id))
            .await?;

        info!(
            content_id = %content_id,
            user_id = %user_id,
            liked = outcome.liked,
            like_count = outcome.like_count,
            "Like toggled"
        );

        Ok(outcome)
    }

    /// Whether the user currently likes the content
    #[instrument(skip(self))]
    pub async fn is_liked(&self, content_id: Snowflake, user_id: Snowflake) -> ServiceResult<bool> {
        Ok(self.ctx.like_repo().exists(content_id, user_id).await?)
    }
}
