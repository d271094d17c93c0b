//! Handler for link creation.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::warn;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::handlers::caller_id;
use crate::domain::entities::ExpiryPolicy;
use crate::error::AppError;
use crate::jobs::AnalysisTask;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/urls`
///
/// Caller identity comes from the `X-User-Id` header; anonymous creation is
/// allowed but gets no profile-biased suggestions.
///
/// Every few created links (per owner) a pattern refresh is enqueued. The
/// enqueue is fire-and-forget: a full queue drops the trigger and the next
/// one catches up.
///
/// # Errors
///
/// - 400 for an invalid URL or slug
/// - 409 if a custom slug is taken, or slug generation keeps colliding
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ShortenRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let owner = caller_id(&headers);
    let expiry = ExpiryPolicy::from_click_limit(request.expires_after_clicks);

    let created = state
        .link_service
        .create_link(
            &request.url,
            request.custom_slug,
            request.keywords,
            owner.clone(),
            expiry,
        )
        .await?;

    if let Some(owner) = owner {
        if let Ok(count) = state.link_service.count_for_owner(&owner).await {
            if state.pattern_service.should_trigger(count) {
                let task = AnalysisTask {
                    user_id: owner,
                    force: false,
                };
                if state.analysis_tx.try_send(task).is_err() {
                    warn!("analysis queue full, dropping refresh trigger");
                    metrics::counter!("dashlink_analysis_triggers_dropped").increment(1);
                }
            }
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse::from_created(&created, &state.base_url)),
    ))
}
