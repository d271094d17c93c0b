//! Background worker draining the click queue.
//!
//! The redirect handler never waits on analytics: it pushes a [`ClickEvent`]
//! onto a bounded channel and answers immediately. This worker derives the
//! dimensional data (country, device, browser, referrer domain), records the
//! click, and bumps the link's click counter. Every failure is caught here —
//! nothing propagates back to a user-facing request.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::entities::{ClickEvent, NewClick};
use crate::domain::repositories::{AnalyticsRepository, LinkRepository};
use crate::error::AppError;
use crate::infrastructure::geoip::CountryResolver;
use crate::utils::client_info::{parse_user_agent, referrer_domain, visitor_hash};

pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    links: Arc<dyn LinkRepository>,
    analytics: Arc<dyn AnalyticsRepository>,
    geo: Arc<dyn CountryResolver>,
) {
    while let Some(event) = rx.recv().await {
        let slug = event.slug.clone();
        match process_click(event, &links, &analytics, &geo).await {
            Ok(true) => {
                metrics::counter!("dashlink_clicks_recorded").increment(1);
            }
            Ok(false) => {
                debug!(slug, "duplicate click event dropped");
                metrics::counter!("dashlink_clicks_duplicate").increment(1);
            }
            Err(e) => {
                warn!(slug, "failed to record click: {e}");
                metrics::counter!("dashlink_clicks_failed").increment(1);
            }
        }
    }
    info!("click worker stopped");
}

/// Resolves dimensions and records one click.
///
/// The dedup gate runs first: a redelivered event must not move the link's
/// click counter either. Returns `Ok(false)` for duplicates.
async fn process_click(
    event: ClickEvent,
    links: &Arc<dyn LinkRepository>,
    analytics: &Arc<dyn AnalyticsRepository>,
    geo: &Arc<dyn CountryResolver>,
) -> Result<bool, AppError> {
    let country = match event.header_country {
        Some(c) => Some(c),
        None => match event.ip.as_deref() {
            Some(ip) => geo.resolve(ip).await,
            None => None,
        },
    };

    let (device, browser) = parse_user_agent(event.user_agent.as_deref());

    let click = NewClick {
        slug: event.slug,
        idempotency_key: event.idempotency_key,
        occurred_at: event.occurred_at,
        country,
        device,
        browser,
        referrer_domain: referrer_domain(event.referrer.as_deref()),
        visitor_hash: visitor_hash(event.ip.as_deref(), event.user_agent.as_deref()),
    };

    let slug = click.slug.clone();
    let recorded = analytics.record(click).await?;
    if recorded {
        links.increment_clicks(&slug).await?;
    }

    Ok(recorded)
}
