//! Repository trait for click recording and aggregated analytics.

use crate::domain::entities::{AnalyticsSummary, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// The single owner of analytics state: raw click records and the
/// incrementally maintained per-link rollups.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAnalyticsRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryAnalyticsRepository`] - in-process
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Records one click and folds it into the aggregates.
    ///
    /// Deduplicates by idempotency key: a redelivered event returns
    /// `Ok(false)` and leaves every counter untouched. Exactly one date
    /// bucket and one counter per dimension move by one per accepted click.
    async fn record(&self, click: NewClick) -> Result<bool, AppError>;

    /// Current rollup snapshot for a slug.
    ///
    /// Never recomputes from raw events; a slug with no recorded clicks
    /// yields an all-zero summary.
    async fn summary(&self, slug: &str) -> Result<AnalyticsSummary, AppError>;
}
