//! Content handlers
//!
//! Content lookup plus the engagement endpoints: views, likes, and counter
//! reconciliation.

use axum::extract::{Path, State};
use serde::Serialize;
use share_core::Snowflake;
use share_service::dto::{
    ContentResponse, CreateContentRequest, LikeResponse, ReconcileReport, ViewResponse,
};
use share_service::{ContentService, CounterService, LikeService, ViewService};
use tracing::{debug, warn};

use crate::extractors::{AuthUser, ContentIdPath, ValidatedJson, ViewerSignals};
use crate::response::{ApiJson, ApiResult, Created};
use crate::state::AppState;

/// Body of a successful delete
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Snowflake,
}

/// Create content owned by the caller
///
/// POST /contents
pub async fn create_content(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateContentRequest>,
) -> ApiResult<Created<ApiJson<ContentResponse>>> {
    let content = ContentService::new(state.service_context())
        .create_content(auth.user_id, request)
        .await?;
    Ok(Created(ApiJson::new(ContentResponse::from(content))))
}

/// Get content, counting the request as a view
///
/// GET /contents/{content_id}
///
/// Counting is best effort: a failure to record the view is logged and the
/// content is still returned, without the `view` field. Authenticated
/// callers also get `liked`.
pub async fn get_content(
    State(state): State<AppState>,
    Path(path): Path<ContentIdPath>,
    ViewerSignals(signals): ViewerSignals,
) -> ApiResult<ApiJson<ContentResponse>> {
    let content_id = path.content_id()?;
    let ctx = state.service_context();

    let view = match ViewService::new(ctx).record_view(content_id, &signals).await {
        Ok(outcome) => Some(ViewResponse::from(outcome)),
        Err(e) if e.status_code() == 404 => {
            debug!(content_id = %content_id, "View skipped for unknown content");
            None
        }
        Err(e) => {
            warn!(content_id = %content_id, error = %e, "View recording failed");
            None
        }
    };

    let content = ContentService::new(ctx).get_content(content_id).await?;

    let mut response = ContentResponse::from(content);
    response.view = view;
    if let Some(user_id) = signals.principal {
        response.liked = Some(
            LikeService::new(ctx)
                .is_liked(content_id, user_id)
                .await?,
        );
    }

    Ok(ApiJson::new(response))
}

/// Record a view
///
/// POST /contents/{content_id}/views
pub async fn record_view(
    State(state): State<AppState>,
    Path(path): Path<ContentIdPath>,
    ViewerSignals(signals): ViewerSignals,
) -> ApiResult<ApiJson<ViewResponse>> {
    let content_id = path.content_id()?;
    let outcome = ViewService::new(state.service_context())
        .record_view(content_id, &signals)
        .await?;
    Ok(ApiJson::new(ViewResponse::from(outcome)))
}

/// Toggle the caller's like
///
/// POST /contents/{content_id}/like
pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ContentIdPath>,
) -> ApiResult<ApiJson<LikeResponse>> {
    let content_id = path.content_id()?;
    let outcome = LikeService::new(state.service_context())
        .toggle_like(content_id, auth.user_id)
        .await?;
    Ok(ApiJson::new(LikeResponse::from(outcome)))
}

/// Delete content
///
/// DELETE /contents/{content_id}
pub async fn delete_content(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ContentIdPath>,
) -> ApiResult<ApiJson<DeletedResponse>> {
    let content_id = path.content_id()?;
    ContentService::new(state.service_context())
        .delete_content(content_id, auth.user_id)
        .await?;
    Ok(ApiJson::new(DeletedResponse { id: content_id }).with_message("Content deleted"))
}

/// Recompute counters from the fact tables
///
/// POST /contents/{content_id}/reconcile
pub async fn reconcile_content(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<ContentIdPath>,
) -> ApiResult<ApiJson<ReconcileReport>> {
    let content_id = path.content_id()?;
    let report = CounterService::new(state.service_context())
        .reconcile(content_id)
        .await?;
    Ok(ApiJson::new(report))
}
