//! Repository trait for user naming-pattern profiles.

use crate::domain::entities::PatternProfile;
use crate::error::AppError;
use async_trait::async_trait;
use std::time::Duration;

/// The single owner of `PatternProfile` state.
///
/// The claim operation is the concurrency guard for the whole
/// check-then-analyze-then-write sequence: two triggers racing for the same
/// user (incremental plus weekly batch) resolve to a single analysis run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<PatternProfile>, AppError>;

    /// Overwrites the user's profile with a fresh analysis result.
    async fn upsert(&self, profile: PatternProfile) -> Result<(), AppError>;

    /// Atomically claims the right to analyze a user.
    ///
    /// Returns `Ok(true)` and stamps the claim when no analysis ran within
    /// `cooldown` (or when `force` is set); returns `Ok(false)` otherwise.
    /// Compare-and-set, not read-then-write: concurrent claims for one user
    /// admit exactly one caller.
    async fn try_claim_analysis(
        &self,
        user_id: &str,
        cooldown: Duration,
        force: bool,
    ) -> Result<bool, AppError>;
}
