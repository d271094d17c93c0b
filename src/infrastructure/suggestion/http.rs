//! HTTP client for the suggestion collaborator.
//!
//! Blocking ureq call on the tokio blocking pool. The request timeout here is
//! the transport bound; the creation path additionally wraps the whole call
//! in its own `tokio::time::timeout` and abandons slow responses.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use ureq::Agent;

use super::{SlugSuggestion, SuggestionError, SuggestionProvider};
use crate::domain::entities::PatternProfile;

/// Client for a JSON suggestion endpoint.
///
/// Request: `POST {api_url}` with `{url, keywords, profile?}`.
/// Response: JSON array of `{slug, tier, source, components}`, best first.
///
/// Each client carries its own agent so its timeout is its own; the agent
/// pools connections internally and is cheap to clone.
pub struct HttpSuggestionClient {
    api_url: String,
    agent: Agent,
}

impl HttpSuggestionClient {
    pub fn new(api_url: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            api_url: api_url.to_string(),
            agent,
        }
    }

    fn request_sync(
        agent: Agent,
        url: String,
        body: serde_json::Value,
    ) -> Result<Vec<SlugSuggestion>, SuggestionError> {
        let resp = agent
            .post(&url)
            .send_json(&body)
            .map_err(|e| SuggestionError::Request(e.to_string()))?;

        resp.into_body()
            .read_json::<Vec<SlugSuggestion>>()
            .map_err(|e| SuggestionError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl SuggestionProvider for HttpSuggestionClient {
    async fn suggest(
        &self,
        url: &str,
        profile: Option<PatternProfile>,
        keywords: Vec<String>,
    ) -> Result<Vec<SlugSuggestion>, SuggestionError> {
        let mut body = json!({
            "url": url,
            "keywords": keywords,
        });
        if let Some(profile) = profile {
            body["profile"] = serde_json::to_value(&profile)
                .map_err(|e| SuggestionError::Malformed(e.to_string()))?;
        }

        let api_url = self.api_url.clone();
        let agent = self.agent.clone();

        let suggestions = tokio::task::spawn_blocking(move || {
            Self::request_sync(agent, api_url, body)
        })
        .await
        .map_err(|e| SuggestionError::Request(e.to_string()))??;

        debug!(count = suggestions.len(), "suggestion collaborator answered");
        Ok(suggestions)
    }
}
