//! No-op cache for tests and cache-disabled deployments.

use async_trait::async_trait;
use tracing::debug;

use super::CacheService;

/// Every lookup misses; every write is dropped.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (redirect caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_url(&self, _slug: &str) -> Option<String> {
        None
    }

    async fn set_url(&self, _slug: &str, _original_url: &str) {}
}
