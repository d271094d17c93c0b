//! Click analytics read service.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::AnalyticsSummary;
use crate::domain::repositories::{AnalyticsRepository, LinkRepository};
use crate::error::AppError;

/// Service for reading per-link analytics rollups.
///
/// Writes happen on the telemetry path, not here: the click worker owns
/// recording, this service only answers summary queries.
pub struct AnalyticsService {
    links: Arc<dyn LinkRepository>,
    analytics: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsService {
    pub fn new(links: Arc<dyn LinkRepository>, analytics: Arc<dyn AnalyticsRepository>) -> Self {
        Self { links, analytics }
    }

    /// Returns the rollup for a slug.
    ///
    /// The slug must exist; an expired link still reports its accumulated
    /// history. Unknown slugs come back as [`AppError::NotFound`] rather than
    /// an empty summary, so a typo is distinguishable from a link nobody has
    /// clicked.
    pub async fn summary(&self, slug: &str) -> Result<AnalyticsSummary, AppError> {
        if self.links.find_by_slug(slug).await?.is_none() {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "slug": slug }),
            ));
        }

        self.analytics.summary(slug).await
    }
}
