//! Original-URL parsing and scheme checks for the creation path.

use crate::error::AppError;
use serde_json::json;
use url::Url;

/// Parses and checks a destination URL.
///
/// Only `http` and `https` destinations are accepted; anything else is a
/// user-correctable validation failure.
pub fn parse_original_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        AppError::bad_request("Invalid URL", json!({ "url": raw, "reason": e.to_string() }))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AppError::bad_request(
            "URL must use http or https",
            json!({ "url": raw, "scheme": url.scheme() }),
        ));
    }

    if url.host_str().is_none() {
        return Err(AppError::bad_request(
            "URL must have a host",
            json!({ "url": raw }),
        ));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(parse_original_url("https://example.com/a").is_ok());
        assert!(parse_original_url("http://example.com").is_ok());
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(parse_original_url("ftp://example.com").is_err());
        assert!(parse_original_url("javascript:alert(1)").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_original_url("not-a-url").is_err());
        assert!(parse_original_url("").is_err());
    }

    #[test]
    fn test_trims_whitespace() {
        assert!(parse_original_url("  https://example.com  ").is_ok());
    }
}
