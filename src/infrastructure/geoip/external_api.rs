//! Country lookup through an external HTTP GeoIP API.
//!
//! The blocking HTTP call runs on the tokio blocking pool; results are held
//! in a moka cache so repeat visitors from the same address do not refetch.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{trace, warn};
use ureq::Agent;

use super::CountryResolver;

const GEOIP_CACHE_TTL_SECS: u64 = 15 * 60;
const GEOIP_CACHE_MAX_CAPACITY: u64 = 10_000;
const HTTP_TIMEOUT_SECS: u64 = 2;

static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .build()
            .into()
    })
}

/// GeoIP resolver backed by an HTTP API such as ip-api.com.
///
/// `api_url_template` uses `{ip}` as the placeholder, e.g.
/// `http://ip-api.com/json/{ip}?fields=status,countryCode`.
/// Negative results are cached too, so a dead API does not get hammered.
pub struct ExternalApiResolver {
    api_url_template: String,
    cache: Cache<String, Option<String>>,
}

impl ExternalApiResolver {
    pub fn new(api_url_template: &str) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(GEOIP_CACHE_TTL_SECS))
            .max_capacity(GEOIP_CACHE_MAX_CAPACITY)
            .build();

        Self {
            api_url_template: api_url_template.to_string(),
            cache,
        }
    }

    fn fetch_sync(url: String) -> Option<String> {
        let agent = get_agent();

        let resp = match agent.get(&url).call() {
            Ok(r) => r,
            Err(e) => {
                warn!("GeoIP request to \"{}\" failed: {}", url, e);
                return None;
            }
        };

        let json: serde_json::Value = match resp.into_body().read_json() {
            Ok(j) => j,
            Err(e) => {
                warn!("GeoIP response from \"{}\" parse failed: {}", url, e);
                return None;
            }
        };

        if json["status"].as_str() == Some("fail") {
            trace!("GeoIP API returned fail status");
            return None;
        }

        json["countryCode"]
            .as_str()
            .or_else(|| json["country_code"].as_str())
            .or_else(|| json["country"].as_str())
            .map(|c| c.to_ascii_uppercase())
    }

    async fn fetch(&self, ip: &str) -> Option<String> {
        let url = self.api_url_template.replace("{ip}", ip);

        tokio::task::spawn_blocking(move || Self::fetch_sync(url))
            .await
            .unwrap_or_else(|e| {
                warn!("GeoIP spawn_blocking failed: {}", e);
                None
            })
    }
}

#[async_trait]
impl CountryResolver for ExternalApiResolver {
    async fn resolve(&self, ip: &str) -> Option<String> {
        let ip = ip.to_string();
        self.cache
            .get_with(ip.clone(), async { self.fetch(&ip).await })
            .await
    }
}
