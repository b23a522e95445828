//! Path parameter extractors

use serde::Deserialize;
use share_core::Snowflake;

use crate::response::ApiError;

/// Path parameters with content_id
#[derive(Debug, Deserialize)]
pub struct ContentIdPath {
    pub content_id: String,
}

impl ContentIdPath {
    /// Parse content_id as a positive Snowflake
    pub fn content_id(&self) -> Result<Snowflake, ApiError> {
        Snowflake::parse(&self.content_id)
            .map_err(|_| ApiError::invalid_path("Invalid content_id format"))
    }
}
