//! In-process moka cache for redirect lookups.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use super::CacheService;

const DEFAULT_MAX_CAPACITY: u64 = 100_000;

/// TTL-bounded in-process cache.
///
/// Slugs map to the same URL for their whole lifetime, so the TTL exists only
/// to bound memory on churn-heavy deployments, not for coherence.
pub struct MokaCache {
    cache: Cache<String, String>,
}

impl MokaCache {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(DEFAULT_MAX_CAPACITY)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl CacheService for MokaCache {
    async fn get_url(&self, slug: &str) -> Option<String> {
        self.cache.get(slug).await
    }

    async fn set_url(&self, slug: &str, original_url: &str) {
        self.cache
            .insert(slug.to_string(), original_url.to_string())
            .await;
    }
}
