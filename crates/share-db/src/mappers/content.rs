//! Content entity <-> model mapper

use share_core::entities::{Content, ContentStatus, Counters};
use share_core::error::DomainError;
use share_core::value_objects::Snowflake;

use crate::models::{ContentModel, CountersModel};

/// Convert ContentModel to Content entity
///
/// The status column is constrained by a CHECK, so an unknown value means
/// the schema and this code disagree.
impl TryFrom<ContentModel> for Content {
    type Error = DomainError;

    fn try_from(model: ContentModel) -> Result<Self, Self::Error> {
        let status = model.status.parse::<ContentStatus>().map_err(|_| {
            DomainError::InternalError(format!(
                "content {} has unknown status '{}'",
                model.id, model.status
            ))
        })?;

        Ok(Content {
            id: Snowflake::new(model.id),
            owner_id: Snowflake::new(model.owner_id),
            category_id: Snowflake::new(model.category_id),
            title: model.title,
            media_url: model.media_url,
            status,
            view_count: model.view_count,
            like_count: model.like_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<CountersModel> for Counters {
    fn from(model: CountersModel) -> Self {
        Counters::new(model.view_count, model.like_count)
    }
}

/// Content values for insertion
///
/// Counters are not carried: a new row always starts at zero.
pub struct ContentInsert<'a> {
    pub id: i64,
    pub owner_id: i64,
    pub category_id: i64,
    pub title: &'a str,
    pub media_url: Option<&'a str>,
    pub status: &'static str,
}

impl<'a> ContentInsert<'a> {
    pub fn new(content: &'a Content) -> Self {
        Self {
            id: content.id.into_inner(),
            owner_id: content.owner_id.into_inner(),
            category_id: content.category_id.into_inner(),
            title: &content.title,
            media_url: content.media_url.as_deref(),
            status: content.status.as_str(),
        }
    }
}
