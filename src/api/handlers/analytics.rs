//! Handler for per-link analytics.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::api::dto::analytics::AnalyticsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the analytics rollup for a slug.
///
/// # Endpoint
///
/// `GET /api/analytics/{slug}`
///
/// Expired links still report their accumulated history. Unknown slugs are
/// 404.
pub async fn analytics_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.analytics_service.summary(&slug).await?;
    Ok(Json(AnalyticsResponse::from(summary)))
}
