//! Naming-pattern analysis orchestration.
//!
//! The engine itself is pure; this service adds the admission rules around
//! it: the per-user cooldown claim, the minimum-sample check, and the batch
//! sweep over active users with per-user fault isolation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::application::pattern_engine::build_profile;
use crate::domain::entities::{AnalysisOutcome, BatchResult, SkipReason};
use crate::domain::repositories::{LinkRepository, ProfileRepository};
use crate::error::AppError;

/// Tunables for pattern analysis admission and sampling.
#[derive(Debug, Clone)]
pub struct PatternConfig {
    /// Minimum time between analyses of one user, unless forced.
    pub cooldown: Duration,
    /// Minimum analyzable slugs before a profile is produced.
    pub min_links: i64,
    /// How many recent slugs feed one analysis pass.
    pub sample_size: i64,
    /// A user's Nth link (every multiple of this) triggers a refresh.
    pub refresh_every: i64,
    /// How far back the batch sweep looks for active users.
    pub active_window: Duration,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(24 * 3600),
            min_links: 5,
            sample_size: 20,
            refresh_every: 5,
            active_window: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

/// Service for deriving and refreshing per-user naming profiles.
pub struct PatternService {
    links: Arc<dyn LinkRepository>,
    profiles: Arc<dyn ProfileRepository>,
    config: PatternConfig,
}

impl PatternService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        profiles: Arc<dyn ProfileRepository>,
        config: PatternConfig,
    ) -> Self {
        Self {
            links,
            profiles,
            config,
        }
    }

    /// Whether creating the `count`th link should trigger an incremental
    /// refresh for its owner.
    pub fn should_trigger(&self, count: i64) -> bool {
        count > 0 && count % self.config.refresh_every == 0
    }

    /// Analyzes one user's recent slugs and upserts their profile.
    ///
    /// Returns `Skipped(Cooldown)` when another analysis ran (or is running)
    /// inside the cooldown window, and `Skipped(NotEnoughLinks)` when the
    /// sample is below the minimum. `force` bypasses only the cooldown.
    pub async fn analyze_user(
        &self,
        user_id: &str,
        force: bool,
    ) -> Result<AnalysisOutcome, AppError> {
        let claimed = self
            .profiles
            .try_claim_analysis(user_id, self.config.cooldown, force)
            .await?;
        if !claimed {
            debug!(user_id, "analysis inside cooldown window, skipping");
            return Ok(AnalysisOutcome::Skipped(SkipReason::Cooldown));
        }

        let slugs = self
            .links
            .recent_slugs_for_owner(user_id, self.config.sample_size)
            .await?;

        match build_profile(user_id, &slugs, self.config.min_links, Utc::now()) {
            Some(profile) => {
                info!(
                    user_id,
                    links_analyzed = profile.links_analyzed,
                    confidence = profile.confidence,
                    "naming profile updated"
                );
                self.profiles.upsert(profile.clone()).await?;
                Ok(AnalysisOutcome::Updated(profile))
            }
            None => {
                debug!(user_id, sample = slugs.len(), "not enough links to analyze");
                Ok(AnalysisOutcome::Skipped(SkipReason::NotEnoughLinks))
            }
        }
    }

    /// Batch sweep: analyzes every user active inside the window.
    ///
    /// One user's failure never aborts the sweep; it is counted and the
    /// sweep moves on.
    pub async fn analyze_all_active_users(&self) -> Result<BatchResult, AppError> {
        let since = Utc::now()
            - chrono::Duration::from_std(self.config.active_window)
                .unwrap_or_else(|_| chrono::Duration::days(7));

        let owners = self
            .links
            .active_owners(since, self.config.min_links)
            .await?;

        let mut result = BatchResult {
            total: owners.len(),
            ..Default::default()
        };

        for owner in owners {
            match self.analyze_user(&owner, false).await {
                Ok(AnalysisOutcome::Updated(_)) => result.successful += 1,
                Ok(AnalysisOutcome::Skipped(_)) => result.skipped += 1,
                Err(e) => {
                    warn!(user_id = %owner, error = %e, "batch analysis failed for user");
                    result.failed += 1;
                    result.errors.push((owner, e.to_string()));
                }
            }
        }

        info!(
            total = result.total,
            successful = result.successful,
            skipped = result.skipped,
            failed = result.failed,
            "batch pattern analysis finished"
        );
        Ok(result)
    }
}
