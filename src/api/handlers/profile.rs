//! Handlers for naming-profile inspection and on-demand analysis.

use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::dto::profile::{AnalyzeResponse, ProfileResponse};
use crate::api::handlers::require_caller_id;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the caller's naming profile.
///
/// # Endpoint
///
/// `GET /api/profile` (requires `X-User-Id`)
pub async fn profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let owner = require_caller_id(&headers)?;

    let profile = state.profiles.get(&owner).await?.ok_or_else(|| {
        AppError::not_found("No naming profile yet", json!({ "userId": owner }))
    })?;

    Ok(Json(ProfileResponse::from(profile)))
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    /// Bypasses the cooldown window (but not the minimum sample).
    #[serde(default)]
    pub force: bool,
}

/// Runs pattern analysis for the caller synchronously.
///
/// # Endpoint
///
/// `POST /api/profile/analyze` (requires `X-User-Id`)
pub async fn analyze_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Option<Json<AnalyzeRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let owner = require_caller_id(&headers)?;
    let force = request.map(|Json(r)| r.force).unwrap_or(false);

    let outcome = state.pattern_service.analyze_user(&owner, force).await?;
    Ok(Json(AnalyzeResponse::from(outcome)))
}
