//! Short-link entity and slug candidate types.

use chrono::{DateTime, Utc};

/// Expiry policy attached to a link at creation time.
///
/// Click-limited links stop resolving once their cumulative click count
/// reaches the limit; the destination is never exposed past that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPolicy {
    None,
    AfterClicks(i64),
}

impl ExpiryPolicy {
    /// Storage form: `None` maps to a NULL click limit.
    pub fn click_limit(&self) -> Option<i64> {
        match self {
            ExpiryPolicy::None => None,
            ExpiryPolicy::AfterClicks(n) => Some(*n),
        }
    }

    pub fn from_click_limit(limit: Option<i64>) -> Self {
        match limit {
            Some(n) if n > 0 => ExpiryPolicy::AfterClicks(n),
            _ => ExpiryPolicy::None,
        }
    }
}

/// A shortened link: the mapping from a slug to its original URL, with
/// ownership and click-count metadata.
///
/// The slug is globally unique and, once assigned, never points at a
/// different URL. The click count is mutated only through the link store.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub slug: String,
    pub long_url: String,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub clicks: i64,
    pub expiry: ExpiryPolicy,
}

impl Link {
    /// True once a click-limited link has used up its budget.
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            ExpiryPolicy::None => false,
            ExpiryPolicy::AfterClicks(limit) => self.clicks >= limit,
        }
    }
}

/// Input for creating a link. The slug has already passed validation.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub slug: String,
    pub long_url: String,
    pub owner_id: Option<String>,
    pub expiry: ExpiryPolicy,
}

/// Confidence tier reported by the suggestion collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

/// Where a slug came from.
///
/// Downstream consumers branch on this variant instead of inspecting string
/// prefixes.
#[derive(Debug, Clone, PartialEq)]
pub enum SlugOrigin {
    /// User-requested; validated verbatim, never mutated.
    Custom,
    /// Produced by the suggestion collaborator.
    AiGenerated {
        tier: ConfidenceTier,
        components: Vec<String>,
    },
    /// Deterministically derived from the URL.
    Fallback,
}

/// A proposed slug before uniqueness has been confirmed by the store.
#[derive(Debug, Clone)]
pub struct SlugCandidate {
    pub slug: String,
    pub origin: SlugOrigin,
}
