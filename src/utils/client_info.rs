//! Click-context extraction: device class, browser family, referrer domain,
//! and the visitor hash used for unique-visitor estimation.

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use url::Url;
use woothee::parser::Parser;

/// Device class derived from the User-Agent header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    Mobile,
    Tablet,
    Unknown,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Desktop => "desktop",
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a User-Agent string into a device class and browser family.
///
/// Tablets are detected by substring before handing off to woothee, which
/// folds them into its smartphone category.
pub fn parse_user_agent(user_agent: Option<&str>) -> (DeviceClass, String) {
    let Some(ua) = user_agent else {
        return (DeviceClass::Unknown, "Unknown".to_string());
    };

    if ua.contains("iPad") || ua.to_ascii_lowercase().contains("tablet") {
        let browser = Parser::new()
            .parse(ua)
            .map(|r| r.name.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        return (DeviceClass::Tablet, browser);
    }

    match Parser::new().parse(ua) {
        Some(result) => {
            let device = match result.category {
                "pc" => DeviceClass::Desktop,
                "smartphone" | "mobilephone" => DeviceClass::Mobile,
                _ => DeviceClass::Unknown,
            };
            let browser = if result.name == "UNKNOWN" {
                "Unknown".to_string()
            } else {
                result.name.to_string()
            };
            (device, browser)
        }
        None => (DeviceClass::Unknown, "Unknown".to_string()),
    }
}

/// Extracts the registrable host from a Referer header value.
///
/// Strips a leading `www.`; invalid URLs yield `None` so direct traffic and
/// garbage referrers land in the same bucket.
pub fn referrer_domain(referrer: Option<&str>) -> Option<String> {
    let raw = referrer?;
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    Some(host.to_ascii_lowercase())
}

/// Country code from edge headers, when a proxy or CDN resolved it upstream.
pub fn country_from_headers(headers: &HeaderMap) -> Option<String> {
    for name in ["cf-ipcountry", "x-country-code"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let code = value.trim().to_ascii_uppercase();
            if !code.is_empty() && code != "XX" {
                return Some(code);
            }
        }
    }
    None
}

/// Stable per-visitor hash over IP and User-Agent.
///
/// Truncated sha256, hex-encoded. The raw IP never reaches the aggregates.
pub fn visitor_hash(ip: Option<&str>, user_agent: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.unwrap_or("-").as_bytes());
    hasher.update(b"|");
    hasher.update(user_agent.unwrap_or("-").as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}
