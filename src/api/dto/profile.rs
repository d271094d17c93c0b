//! DTOs for the naming-profile endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{AnalysisOutcome, PatternProfile, SkipReason};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    pub last_analyzed: DateTime<Utc>,
    pub components: Vec<String>,
    pub structure: String,
    pub separator: String,
    pub avg_word_count: f64,
    pub capitalization: String,
    pub confidence: f64,
    pub links_analyzed: i64,
}

impl From<PatternProfile> for ProfileResponse {
    fn from(profile: PatternProfile) -> Self {
        Self {
            user_id: profile.user_id,
            last_analyzed: profile.last_analyzed,
            components: profile.components,
            structure: profile.structure,
            separator: profile.separator.to_string(),
            avg_word_count: profile.avg_word_count,
            capitalization: profile.capitalization.as_str().to_string(),
            confidence: profile.confidence,
            links_analyzed: profile.links_analyzed,
        }
    }
}

/// Result of an explicit analysis request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum AnalyzeResponse {
    Updated { profile: ProfileResponse },
    Skipped { reason: String },
}

impl From<AnalysisOutcome> for AnalyzeResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Updated(profile) => AnalyzeResponse::Updated {
                profile: profile.into(),
            },
            AnalysisOutcome::Skipped(SkipReason::Cooldown) => AnalyzeResponse::Skipped {
                reason: "cooldown".to_string(),
            },
            AnalysisOutcome::Skipped(SkipReason::NotEnoughLinks) => AnalyzeResponse::Skipped {
                reason: "not_enough_links".to_string(),
            },
        }
    }
}
