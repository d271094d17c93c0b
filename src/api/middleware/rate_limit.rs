//! Rate limiting for the ingestion endpoints.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota};
use serde_json::json;

use crate::error::ErrorInfo;

/// Keyed quota gate in front of the ingestion endpoints.
///
/// Keys are caller identities (`X-User-Id`, falling back to peer IP). The
/// underlying counter is lock-free, so concurrent requests for one key never
/// lose an increment.
pub struct IngestionGate {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl IngestionGate {
    /// A gate admitting `limit` requests per `window` per key, with the full
    /// limit available as burst.
    pub fn new(limit: u32, window: Duration) -> Self {
        let limit = NonZeroU32::new(limit.max(1)).unwrap_or(NonZeroU32::MIN);
        let replenish = window / limit.get();
        let quota = Quota::with_period(replenish)
            .unwrap_or_else(|| Quota::per_second(limit))
            .allow_burst(limit);

        Self {
            limiter: DefaultKeyedRateLimiter::keyed(quota),
        }
    }

    /// Whether this request is admitted; counting is the side effect.
    pub fn allow(&self, client_key: &str) -> bool {
        self.limiter.check_key(&client_key.to_string()).is_ok()
    }
}

/// Axum middleware applying an [`IngestionGate`] to a route group.
pub async fn gate_middleware(
    State(gate): State<Arc<IngestionGate>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(
        request.headers(),
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr),
    );

    if !gate.allow(&key) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": ErrorInfo {
                    code: "rate_limited",
                    message: "Too many requests".to_string(),
                    details: json!({}),
                }
            })),
        )
            .into_response();
    }

    next.run(request).await
}

fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "anonymous".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_exhausts_quota() {
        let gate = IngestionGate::new(3, Duration::from_secs(60));

        assert!(gate.allow("u1"));
        assert!(gate.allow("u1"));
        assert!(gate.allow("u1"));
        assert!(!gate.allow("u1"));
    }

    #[test]
    fn test_keys_are_independent() {
        let gate = IngestionGate::new(1, Duration::from_secs(60));

        assert!(gate.allow("u1"));
        assert!(!gate.allow("u1"));
        assert!(gate.allow("u2"));
    }

    #[test]
    fn test_client_key_prefers_user_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "u42".parse().unwrap());
        let peer = Some("10.0.0.1:5000".parse().unwrap());

        assert_eq!(client_key(&headers, peer), "u42");
        assert_eq!(client_key(&HeaderMap::new(), peer), "10.0.0.1");
        assert_eq!(client_key(&HeaderMap::new(), None), "anonymous");
    }

    #[tokio::test]
    async fn test_concurrent_increments_do_not_overadmit() {
        let gate = Arc::new(IngestionGate::new(10, Duration::from_secs(60)));

        let mut handles = Vec::new();
        for _ in 0..40 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move { gate.allow("hot-key") }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }
}
