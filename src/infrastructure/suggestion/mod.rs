//! External AI suggestion collaborator.
//!
//! The generator consults this interface for slug candidates; the contract
//! is deliberately narrow so the engine never depends on which model sits on
//! the other side. Unavailability is an expected state — the caller falls
//! back to deterministic generation and never surfaces the failure.

mod http;

pub use http::HttpSuggestionClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{ConfidenceTier, PatternProfile};

/// Where a suggestion came from, as reported by the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Ai,
    Fallback,
}

/// One candidate returned by the collaborator, ordered best-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugSuggestion {
    pub slug: String,
    #[serde(default = "default_tier")]
    pub tier: ConfidenceTier,
    #[serde(default = "default_source")]
    pub source: SuggestionSource,
    #[serde(default)]
    pub components: Vec<String>,
}

fn default_tier() -> ConfidenceTier {
    ConfidenceTier::Low
}

fn default_source() -> SuggestionSource {
    SuggestionSource::Ai
}

/// Collaborator failure modes. All of them route the caller to the
/// deterministic fallback.
#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    #[error("suggestion service not configured")]
    Disabled,
    #[error("suggestion request failed: {0}")]
    Request(String),
    #[error("suggestion response malformed: {0}")]
    Malformed(String),
}

/// External slug-suggestion service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Requests candidates for a URL, biased by the owner's naming profile
    /// when one exists. Read-only; no side effects on the collaborator.
    async fn suggest(
        &self,
        url: &str,
        profile: Option<PatternProfile>,
        keywords: Vec<String>,
    ) -> Result<Vec<SlugSuggestion>, SuggestionError>;
}

/// Provider used when no suggestion API is configured; every call reports
/// `Disabled` and creation takes the deterministic path.
pub struct NullSuggestionProvider;

#[async_trait]
impl SuggestionProvider for NullSuggestionProvider {
    async fn suggest(
        &self,
        _url: &str,
        _profile: Option<PatternProfile>,
        _keywords: Vec<String>,
    ) -> Result<Vec<SlugSuggestion>, SuggestionError> {
        Err(SuggestionError::Disabled)
    }
}
