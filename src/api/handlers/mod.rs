//! HTTP request handlers.

mod analytics;
mod health;
mod links;
mod profile;
mod redirect;
mod shorten;

pub use analytics::analytics_handler;
pub use health::health_handler;
pub use links::links_handler;
pub use profile::{analyze_handler, profile_handler};
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;

use axum::http::HeaderMap;
use serde_json::json;

use crate::error::AppError;

const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity, when the upstream auth layer attached one.
pub(crate) fn caller_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Caller identity for endpoints that require one.
pub(crate) fn require_caller_id(headers: &HeaderMap) -> Result<String, AppError> {
    caller_id(headers).ok_or_else(|| {
        AppError::bad_request(
            "Missing X-User-Id header",
            json!({ "header": "X-User-Id" }),
        )
    })
}
