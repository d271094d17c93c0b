//! Click event types and the per-link analytics summary.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::utils::client_info::DeviceClass;

/// Raw click context captured in the redirect handler and passed to the
/// background worker over a bounded channel.
///
/// Carries unparsed header values; dimension derivation happens off the
/// request path, in the worker. The idempotency key is server-assigned at
/// capture time and deduplicates at-least-once delivery into the aggregator.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub slug: String,
    pub idempotency_key: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    /// Country resolved upstream by an edge proxy, when present.
    pub header_country: Option<String>,
}

impl ClickEvent {
    pub fn new(
        slug: String,
        ip: Option<String>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
        header_country: Option<String>,
    ) -> Self {
        Self {
            slug,
            idempotency_key: Uuid::new_v4(),
            occurred_at: Utc::now(),
            ip,
            user_agent: user_agent.map(str::to_string),
            referrer: referrer.map(str::to_string),
            header_country,
        }
    }
}

/// A click with its dimensions resolved, ready for recording.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub slug: String,
    pub idempotency_key: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub country: Option<String>,
    pub device: DeviceClass,
    pub browser: String,
    pub referrer_domain: Option<String>,
    pub visitor_hash: String,
}

/// Incrementally maintained analytics rollup for one link.
///
/// Counters equal the sum of all recorded (non-duplicate) clicks for the
/// slug; `summarize` reads this snapshot without touching raw events.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsSummary {
    pub total_clicks: i64,
    pub unique_visitors: i64,
    /// Calendar-day buckets (UTC), ascending by date.
    pub clicks_by_date: Vec<(NaiveDate, i64)>,
    pub countries: HashMap<String, i64>,
    pub devices: HashMap<String, i64>,
    pub browsers: HashMap<String, i64>,
    pub referrers: HashMap<String, i64>,
}

/// Dimension bucket label for clicks with no resolvable value.
pub const UNKNOWN_BUCKET: &str = "unknown";

/// Referrer bucket for traffic without a Referer header.
pub const DIRECT_REFERRER: &str = "direct";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_assigns_unique_keys() {
        let a = ClickEvent::new("s".to_string(), None, None, None, None);
        let b = ClickEvent::new("s".to_string(), None, None, None, None);
        assert_ne!(a.idempotency_key, b.idempotency_key);
    }

    #[test]
    fn test_click_event_captures_context() {
        let ev = ClickEvent::new(
            "nike.sale".to_string(),
            Some("1.2.3.4".to_string()),
            Some("Mozilla/5.0"),
            Some("https://google.com"),
            Some("US".to_string()),
        );
        assert_eq!(ev.slug, "nike.sale");
        assert_eq!(ev.ip.as_deref(), Some("1.2.3.4"));
        assert_eq!(ev.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(ev.referrer.as_deref(), Some("https://google.com"));
        assert_eq!(ev.header_country.as_deref(), Some("US"));
    }
}
