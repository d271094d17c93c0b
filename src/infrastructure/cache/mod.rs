//! Redirect cache: slug → original URL.
//!
//! Redirects are the read-hot path; the cache keeps them off storage. Cache
//! failures always degrade to a store lookup, never to a user-facing error.
//! Click-limited links are never cached — their expiry check needs the live
//! click count.

mod moka_cache;
mod null_cache;

pub use moka_cache::MokaCache;
pub use null_cache::NullCache;

use async_trait::async_trait;

/// Thread-safe slug → URL cache.
#[async_trait]
pub trait CacheService: Send + Sync {
    /// `Some(url)` on hit, `None` on miss.
    async fn get_url(&self, slug: &str) -> Option<String>;

    /// Stores a mapping. Implementations log failures and keep going.
    async fn set_url(&self, slug: &str, original_url: &str);
}
