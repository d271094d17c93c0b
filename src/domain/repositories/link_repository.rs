//! Repository trait for the link store.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The single owner of `Link` rows and the only writer of click counts.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process,
///   used by tests and the storage-less deployment mode
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a link, enforcing slug uniqueness atomically.
    ///
    /// Two concurrent calls with the same slug yield exactly one success;
    /// the loser receives [`AppError::Conflict`]. Existing slugs are never
    /// overwritten.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Looks up a link by slug. Case-sensitive.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError>;

    /// Adds one to the link's click count.
    ///
    /// Increments for a single slug are serialized; concurrent clicks never
    /// lose updates.
    async fn increment_clicks(&self, slug: &str) -> Result<(), AppError>;

    /// Number of links owned by a user.
    async fn count_for_owner(&self, owner_id: &str) -> Result<i64, AppError>;

    /// All links owned by a user, newest first.
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Link>, AppError>;

    /// The user's most recent slugs, newest first, capped at `limit`.
    /// Input to pattern analysis.
    async fn recent_slugs_for_owner(
        &self,
        owner_id: &str,
        limit: i64,
    ) -> Result<Vec<String>, AppError>;

    /// Owners with at least `min_links` links created since `since`.
    /// Defines the batch-analysis population.
    async fn active_owners(
        &self,
        since: DateTime<Utc>,
        min_links: i64,
    ) -> Result<Vec<String>, AppError>;
}
