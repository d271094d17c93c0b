//! Handler for listing an owner's links.

use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};

use crate::api::dto::links::{LinkItem, LinkListResponse};
use crate::api::handlers::require_caller_id;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/urls` (requires `X-User-Id`)
pub async fn links_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let owner = require_caller_id(&headers)?;
    let links = state.link_service.list_for_owner(&owner).await?;

    Ok(Json(LinkListResponse {
        total: links.len(),
        items: links.iter().map(LinkItem::from).collect(),
    }))
}
