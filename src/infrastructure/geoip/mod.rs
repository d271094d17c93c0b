//! IP-to-country resolution for click dimensions.
//!
//! Most deployments sit behind an edge proxy that stamps a country header on
//! the request; the resolver only runs for clicks that arrive without one.

mod external_api;

pub use external_api::ExternalApiResolver;

use async_trait::async_trait;

/// Resolves a client IP to an ISO 3166-1 alpha-2 country code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountryResolver: Send + Sync {
    /// Best-effort lookup; `None` on failure or unknown.
    async fn resolve(&self, ip: &str) -> Option<String>;
}

/// Resolver used when no GeoIP API is configured; every lookup misses and
/// clicks land in the unknown bucket.
pub struct NullCountryResolver;

#[async_trait]
impl CountryResolver for NullCountryResolver {
    async fn resolve(&self, _ip: &str) -> Option<String> {
        None
    }
}
