//! Per-user naming-pattern profile inferred from slug history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Capitalization style dominating a user's slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStyle {
    Lowercase,
    Titlecase,
    Uppercase,
}

impl CaseStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStyle::Lowercase => "lowercase",
            CaseStyle::Titlecase => "titlecase",
            CaseStyle::Uppercase => "uppercase",
        }
    }
}

/// Inferred naming convention for one user.
///
/// Owned exclusively by the pattern detection engine; overwritten, never
/// appended, on each analysis pass. Fed back into the suggestion collaborator
/// to bias future slug proposals toward the user's established style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternProfile {
    pub user_id: String,
    pub last_analyzed: DateTime<Utc>,
    /// Recurring tokens (merchant and category names), most frequent first.
    pub components: Vec<String>,
    /// Dominant word-category structure, e.g. `Brand.Noun.Action`.
    pub structure: String,
    pub separator: char,
    pub avg_word_count: f64,
    pub capitalization: CaseStyle,
    /// 0.0–1.0, proportional to sample size and token dominance.
    pub confidence: f64,
    pub links_analyzed: i64,
}

/// Outcome of a single-user analysis request.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Updated(PatternProfile),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Analyzed within the cooldown window and `force` was not set.
    Cooldown,
    /// Fewer links than the minimum sample.
    NotEnoughLinks,
}

/// Summary of a batch analysis run over all active users.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub total: usize,
    pub successful: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<(String, String)>,
}
