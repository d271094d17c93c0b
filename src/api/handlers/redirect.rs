//! Handler for short URL redirect.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts, Path, State},
    http::{HeaderMap, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::domain::entities::{ClickEvent, ExpiryPolicy};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_info::country_from_headers;

/// Peer address recorded by the connect-info service.
///
/// Read from request extensions instead of the `ConnectInfo` extractor: no
/// connect-info service is installed under in-process test servers, and a
/// missing address must not reject the request.
pub struct PeerAddr(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for PeerAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0),
        ))
    }
}

/// Redirects a slug to its original URL.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Request Flow
///
/// 1. Check the cache (only never-expiring links are ever cached)
/// 2. On miss, resolve through the link service; expired and missing slugs
///    both come back 404
/// 3. Enqueue a click event for the background worker
/// 4. Return `302 Found`
///
/// # Click Tracking
///
/// Telemetry must never delay or fail the redirect: the event goes over a
/// bounded channel and is dropped when the queue is full.
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    PeerAddr(peer): PeerAddr,
) -> Result<Response, AppError> {
    let long_url = match state.cache.get_url(&slug).await {
        Some(cached_url) => {
            debug!(slug = %slug, "cache hit");
            cached_url
        }
        None => {
            let link = state.link_service.resolve(&slug).await?;

            // Click-limited links are excluded from the cache: their expiry
            // check needs the live click count.
            if link.expiry == ExpiryPolicy::None {
                let cache = state.cache.clone();
                let cache_slug = slug.clone();
                let url = link.long_url.clone();
                tokio::spawn(async move {
                    cache.set_url(&cache_slug, &url).await;
                });
            }

            link.long_url
        }
    };

    let event = ClickEvent::new(
        slug,
        peer.map(|addr| addr.ip().to_string()),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
        country_from_headers(&headers),
    );

    if state.click_tx.try_send(event).is_err() {
        warn!("click queue full, dropping event");
        metrics::counter!("dashlink_clicks_dropped").increment(1);
    }

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, long_url)],
    )
        .into_response())
}
