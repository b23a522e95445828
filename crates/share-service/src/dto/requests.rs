//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::Validate;

use share_core::{ContentStatus, DomainError, Snowflake};

// ============================================================================
// Content Requests
// ============================================================================

/// Create content request; the owner is the authenticated caller
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContentRequest {
    pub category_id: Snowflake,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 2048, message = "Media URL must be 1-2048 characters"))]
    pub media_url: Option<String>,

    /// Defaults to `published`
    #[serde(default)]
    pub status: ContentStatus,
}

// ============================================================================
// Discovery Requests
// ============================================================================

/// Query string of `GET /discover`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DiscoverQuery {
    /// Restrict to one category; all categories when absent
    pub category_id: Option<Snowflake>,

    #[validate(length(min = 1, max = 16, message = "Status must be 1-16 characters"))]
    pub status: Option<String>,
}

impl DiscoverQuery {
    /// Requested status, `published` when none is given
    pub fn status(&self) -> Result<ContentStatus, DomainError> {
        self.status
            .as_deref()
            .map_or(Ok(ContentStatus::Published), str::parse)
    }
}
