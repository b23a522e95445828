//! Discovery handler

use axum::extract::State;
use share_service::dto::{DiscoverQuery, DiscoveryResponse};
use share_service::DiscoveryService;

use crate::extractors::ValidatedQuery;
use crate::response::{ApiJson, ApiResult};
use crate::state::AppState;

/// Random content, one per category or one from `category_id`
///
/// GET /discover?category_id=&status=
pub async fn get_random(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DiscoverQuery>,
) -> ApiResult<ApiJson<DiscoveryResponse>> {
    let status = query.status()?;
    let selection = DiscoveryService::new(state.service_context())
        .get_random(query.category_id, status)
        .await?;
    Ok(ApiJson::new(DiscoveryResponse::from(selection)))
}
