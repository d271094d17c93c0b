//! In-process repository implementations backed by dashmap.
//!
//! Used by the test suite and by deployments without a configured database.
//! Atomicity contracts are carried by dashmap's per-entry locking: slug
//! creation and the analysis claim both go through the entry API, so the
//! check and the write happen under one shard lock.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::{
    AnalyticsSummary, DIRECT_REFERRER, Link, NewClick, NewLink, PatternProfile, UNKNOWN_BUCKET,
};
use crate::domain::repositories::{AnalyticsRepository, LinkRepository, ProfileRepository};
use crate::error::AppError;

/// In-memory link store.
#[derive(Default)]
pub struct MemoryLinkRepository {
    links: DashMap<String, Link>,
    next_id: AtomicI64,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        match self.links.entry(new_link.slug.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Slug already exists",
                json!({ "slug": new_link.slug }),
            )),
            Entry::Vacant(vacant) => {
                let link = Link {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                    slug: new_link.slug,
                    long_url: new_link.long_url,
                    owner_id: new_link.owner_id,
                    created_at: Utc::now(),
                    clicks: 0,
                    expiry: new_link.expiry,
                };
                vacant.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.get(slug).map(|l| l.clone()))
    }

    async fn increment_clicks(&self, slug: &str) -> Result<(), AppError> {
        match self.links.get_mut(slug) {
            Some(mut link) => {
                link.clicks += 1;
                Ok(())
            }
            None => Err(AppError::not_found(
                "Short link not found",
                json!({ "slug": slug }),
            )),
        }
    }

    async fn count_for_owner(&self, owner_id: &str) -> Result<i64, AppError> {
        Ok(self
            .links
            .iter()
            .filter(|l| l.owner_id.as_deref() == Some(owner_id))
            .count() as i64)
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self
            .links
            .iter()
            .filter(|l| l.owner_id.as_deref() == Some(owner_id))
            .map(|l| l.clone())
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(links)
    }

    async fn recent_slugs_for_owner(
        &self,
        owner_id: &str,
        limit: i64,
    ) -> Result<Vec<String>, AppError> {
        let links = self.list_for_owner(owner_id).await?;
        Ok(links
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|l| l.slug)
            .collect())
    }

    async fn active_owners(
        &self,
        since: DateTime<Utc>,
        min_links: i64,
    ) -> Result<Vec<String>, AppError> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for link in self.links.iter() {
            if link.created_at >= since {
                if let Some(owner) = &link.owner_id {
                    *counts.entry(owner.clone()).or_default() += 1;
                }
            }
        }
        let mut owners: Vec<String> = counts
            .into_iter()
            .filter(|(_, n)| *n >= min_links)
            .map(|(owner, _)| owner)
            .collect();
        owners.sort();
        Ok(owners)
    }
}

#[derive(Default)]
struct SummaryState {
    total: i64,
    visitors: HashSet<String>,
    by_date: BTreeMap<chrono::NaiveDate, i64>,
    countries: HashMap<String, i64>,
    devices: HashMap<String, i64>,
    browsers: HashMap<String, i64>,
    referrers: HashMap<String, i64>,
}

/// In-memory analytics store with incremental rollups.
#[derive(Default)]
pub struct MemoryAnalyticsRepository {
    seen: DashMap<Uuid, ()>,
    summaries: DashMap<String, SummaryState>,
}

impl MemoryAnalyticsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalyticsRepository for MemoryAnalyticsRepository {
    async fn record(&self, click: NewClick) -> Result<bool, AppError> {
        if self.seen.insert(click.idempotency_key, ()).is_some() {
            return Ok(false);
        }

        let mut state = self.summaries.entry(click.slug.clone()).or_default();
        state.total += 1;
        state.visitors.insert(click.visitor_hash);
        *state
            .by_date
            .entry(click.occurred_at.date_naive())
            .or_default() += 1;
        *state
            .countries
            .entry(
                click
                    .country
                    .unwrap_or_else(|| UNKNOWN_BUCKET.to_string()),
            )
            .or_default() += 1;
        *state
            .devices
            .entry(click.device.as_str().to_string())
            .or_default() += 1;
        *state.browsers.entry(click.browser).or_default() += 1;
        *state
            .referrers
            .entry(
                click
                    .referrer_domain
                    .unwrap_or_else(|| DIRECT_REFERRER.to_string()),
            )
            .or_default() += 1;

        Ok(true)
    }

    async fn summary(&self, slug: &str) -> Result<AnalyticsSummary, AppError> {
        let Some(state) = self.summaries.get(slug) else {
            return Ok(AnalyticsSummary::default());
        };

        Ok(AnalyticsSummary {
            total_clicks: state.total,
            unique_visitors: state.visitors.len() as i64,
            clicks_by_date: state.by_date.iter().map(|(d, n)| (*d, *n)).collect(),
            countries: state.countries.clone(),
            devices: state.devices.clone(),
            browsers: state.browsers.clone(),
            referrers: state.referrers.clone(),
        })
    }
}

/// In-memory pattern-profile store.
#[derive(Default)]
pub struct MemoryProfileRepository {
    profiles: DashMap<String, PatternProfile>,
    claims: DashMap<String, DateTime<Utc>>,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn get(&self, user_id: &str) -> Result<Option<PatternProfile>, AppError> {
        Ok(self.profiles.get(user_id).map(|p| p.clone()))
    }

    async fn upsert(&self, profile: PatternProfile) -> Result<(), AppError> {
        self.profiles.insert(profile.user_id.clone(), profile);
        Ok(())
    }

    async fn try_claim_analysis(
        &self,
        user_id: &str,
        cooldown: Duration,
        force: bool,
    ) -> Result<bool, AppError> {
        let now = Utc::now();
        let cooldown = chrono::Duration::from_std(cooldown).unwrap_or(chrono::Duration::zero());

        match self.claims.entry(user_id.to_string()) {
            Entry::Occupied(mut occupied) => {
                if force || now - *occupied.get() >= cooldown {
                    occupied.insert(now);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ExpiryPolicy;
    use crate::utils::client_info::DeviceClass;
    use std::sync::Arc;

    fn new_link(slug: &str, owner: Option<&str>) -> NewLink {
        NewLink {
            slug: slug.to_string(),
            long_url: "https://example.com".to_string(),
            owner_id: owner.map(str::to_string),
            expiry: ExpiryPolicy::None,
        }
    }

    fn click(slug: &str, visitor: &str) -> NewClick {
        NewClick {
            slug: slug.to_string(),
            idempotency_key: Uuid::new_v4(),
            occurred_at: Utc::now(),
            country: Some("US".to_string()),
            device: DeviceClass::Desktop,
            browser: "Chrome".to_string(),
            referrer_domain: Some("google.com".to_string()),
            visitor_hash: visitor.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_enforces_uniqueness() {
        let repo = MemoryLinkRepository::new();
        assert!(repo.create(new_link("a.b", None)).await.is_ok());
        let err = repo.create(new_link("a.b", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_create_single_winner() {
        let repo = Arc::new(MemoryLinkRepository::new());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(new_link("contested.slug", None)).await
            }));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AppError::Conflict { .. }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 15);
    }

    #[tokio::test]
    async fn test_concurrent_increments_conserved() {
        let repo = Arc::new(MemoryLinkRepository::new());
        repo.create(new_link("hot.slug", None)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..100 {
            let repo = repo.clone();
            handles.push(tokio::spawn(
                async move { repo.increment_clicks("hot.slug").await },
            ));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let link = repo.find_by_slug("hot.slug").await.unwrap().unwrap();
        assert_eq!(link.clicks, 100);
    }

    #[tokio::test]
    async fn test_recent_slugs_ordering_and_limit() {
        let repo = MemoryLinkRepository::new();
        for i in 0..8 {
            repo.create(new_link(&format!("slug{i}"), Some("u1")))
                .await
                .unwrap();
        }

        let slugs = repo.recent_slugs_for_owner("u1", 3).await.unwrap();
        assert_eq!(slugs.len(), 3);
        assert_eq!(slugs[0], "slug7");
    }

    #[tokio::test]
    async fn test_active_owners_threshold() {
        let repo = MemoryLinkRepository::new();
        for i in 0..5 {
            repo.create(new_link(&format!("a{i}"), Some("active")))
                .await
                .unwrap();
        }
        repo.create(new_link("b0", Some("quiet"))).await.unwrap();

        let since = Utc::now() - chrono::Duration::days(30);
        let owners = repo.active_owners(since, 5).await.unwrap();
        assert_eq!(owners, vec!["active".to_string()]);
    }

    #[tokio::test]
    async fn test_record_deduplicates_by_key() {
        let repo = MemoryAnalyticsRepository::new();
        let c = click("a.b", "v1");
        assert!(repo.record(c.clone()).await.unwrap());
        assert!(!repo.record(c).await.unwrap());

        let summary = repo.summary("a.b").await.unwrap();
        assert_eq!(summary.total_clicks, 1);
    }

    #[tokio::test]
    async fn test_summary_conservation() {
        let repo = MemoryAnalyticsRepository::new();
        for i in 0..10 {
            repo.record(click("a.b", &format!("v{}", i % 3)))
                .await
                .unwrap();
        }

        let summary = repo.summary("a.b").await.unwrap();
        assert_eq!(summary.total_clicks, 10);
        assert_eq!(summary.unique_visitors, 3);
        let date_sum: i64 = summary.clicks_by_date.iter().map(|(_, n)| n).sum();
        assert_eq!(date_sum, 10);
        assert_eq!(summary.countries.get("US"), Some(&10));
        assert_eq!(summary.devices.get("desktop"), Some(&10));
    }

    #[tokio::test]
    async fn test_summary_unknown_slug_is_zeroed() {
        let repo = MemoryAnalyticsRepository::new();
        let summary = repo.summary("nope").await.unwrap();
        assert_eq!(summary.total_clicks, 0);
        assert!(summary.clicks_by_date.is_empty());
    }

    #[tokio::test]
    async fn test_claim_respects_cooldown() {
        let repo = MemoryProfileRepository::new();
        let cooldown = Duration::from_secs(3600);

        assert!(repo.try_claim_analysis("u1", cooldown, false).await.unwrap());
        assert!(!repo.try_claim_analysis("u1", cooldown, false).await.unwrap());
        // Force bypasses the window.
        assert!(repo.try_claim_analysis("u1", cooldown, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_claims_single_winner() {
        let repo = Arc::new(MemoryProfileRepository::new());
        let cooldown = Duration::from_secs(3600);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.try_claim_analysis("u1", cooldown, false).await.unwrap()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }
}
