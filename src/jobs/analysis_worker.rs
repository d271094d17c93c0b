//! Background worker draining the pattern-analysis queue.
//!
//! Creation handlers enqueue refresh tasks instead of analyzing inline, so
//! the request path never pays for tokenization or profile writes. The queue
//! is bounded; when it is full the enqueue is dropped and the next trigger
//! (or the weekly sweep) catches the user up.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::services::PatternService;
use crate::domain::entities::AnalysisOutcome;

/// A queued request to refresh one user's naming profile.
#[derive(Debug, Clone)]
pub struct AnalysisTask {
    pub user_id: String,
    pub force: bool,
}

/// Consumes analysis tasks until every sender is dropped.
pub async fn run_analysis_worker(
    mut rx: mpsc::Receiver<AnalysisTask>,
    patterns: Arc<PatternService>,
) {
    info!("Analysis worker started");

    while let Some(task) = rx.recv().await {
        match patterns.analyze_user(&task.user_id, task.force).await {
            Ok(AnalysisOutcome::Updated(profile)) => {
                metrics::counter!("dashlink_analyses_updated").increment(1);
                debug!(
                    user_id = %task.user_id,
                    confidence = profile.confidence,
                    "profile refreshed"
                );
            }
            Ok(AnalysisOutcome::Skipped(reason)) => {
                metrics::counter!("dashlink_analyses_skipped").increment(1);
                debug!(user_id = %task.user_id, ?reason, "analysis skipped");
            }
            Err(e) => {
                metrics::counter!("dashlink_analyses_failed").increment(1);
                warn!(user_id = %task.user_id, error = %e, "analysis task failed");
            }
        }
    }

    info!("Analysis worker stopped");
}
