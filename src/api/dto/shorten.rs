//! DTOs for the link creation endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::CreatedLink;
use crate::domain::entities::{ConfidenceTier, SlugOrigin};

/// Request to create a short link.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Optional custom slug; used verbatim or rejected, never altered.
    pub custom_slug: Option<String>,

    /// Optional keywords biasing slug generation.
    #[serde(default)]
    #[validate(length(max = 10, message = "Too many keywords"))]
    pub keywords: Vec<String>,

    /// Optional click budget. The link stops resolving after this many
    /// clicks.
    #[validate(range(min = 1, message = "Click limit must be positive"))]
    pub expires_after_clicks: Option<i64>,
}

/// How the returned slug was produced.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlugOriginDto {
    Custom,
    Ai,
    Fallback,
}

/// Response for a created link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub success: bool,
    pub short_url: String,
    pub short_code: String,
    pub original_url: String,
    pub origin: SlugOriginDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<ConfidenceTier>,
}

impl ShortenResponse {
    pub fn from_created(created: &CreatedLink, base_url: &str) -> Self {
        let (origin, tier) = match &created.origin {
            SlugOrigin::Custom => (SlugOriginDto::Custom, None),
            SlugOrigin::AiGenerated { tier, .. } => (SlugOriginDto::Ai, Some(*tier)),
            SlugOrigin::Fallback => (SlugOriginDto::Fallback, None),
        };

        Self {
            success: true,
            short_url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                created.link.slug
            ),
            short_code: created.link.slug.clone(),
            original_url: created.link.long_url.clone(),
            origin,
            tier,
        }
    }
}
