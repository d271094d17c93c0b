//! Weekly batch-analysis scheduler.
//!
//! Fires every Sunday at 02:00 UTC and sweeps all active users through
//! pattern analysis. Start is idempotent per process: repeated calls take
//! the flag once and spawn exactly one ticking task.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Datelike, Duration as ChronoDuration, TimeZone, Utc, Weekday};
use tracing::{error, info, warn};

use crate::application::services::PatternService;

static SCHEDULER_STARTED: AtomicBool = AtomicBool::new(false);

const FIRE_HOUR: u32 = 2;

/// Spawns the weekly scheduler. Returns false if it was already running.
pub fn start(patterns: Arc<PatternService>) -> bool {
    if SCHEDULER_STARTED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        warn!("Scheduler already started, ignoring");
        return false;
    }

    tokio::spawn(run(patterns));
    true
}

async fn run(patterns: Arc<PatternService>) {
    info!("Weekly analysis scheduler started");

    loop {
        let wait = until_next_fire();
        info!(sleep_secs = wait.as_secs(), "scheduler sleeping until next run");
        tokio::time::sleep(wait).await;

        match patterns.analyze_all_active_users().await {
            Ok(result) => {
                info!(
                    total = result.total,
                    successful = result.successful,
                    skipped = result.skipped,
                    failed = result.failed,
                    "weekly analysis run complete"
                );
            }
            Err(e) => {
                error!(error = %e, "weekly analysis run failed");
            }
        }
    }
}

/// Time until the next Sunday 02:00 UTC, strictly in the future.
fn until_next_fire() -> std::time::Duration {
    let now = Utc::now();

    let days_ahead = (Weekday::Sun.num_days_from_monday() as i64
        - now.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let candidate_day = now.date_naive() + ChronoDuration::days(days_ahead);
    let candidate = Utc
        .from_utc_datetime(&candidate_day.and_hms_opt(FIRE_HOUR, 0, 0).unwrap_or_default());

    let target = if candidate <= now {
        candidate + ChronoDuration::days(7)
    } else {
        candidate
    };

    (target - now)
        .to_std()
        .unwrap_or(std::time::Duration::from_secs(60))
}
