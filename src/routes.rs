//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{slug}`  - Short link redirect (public)
//! - `GET  /health`  - Health check: process and click queue (public)
//! - `/api/*`        - Creation and analytics endpoints, quota-gated per
//!   caller key
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Keyed quota gates on the `/api` route groups
//! - **Path normalization** - Trailing slash handling (applied in the server)

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::rate_limit::IngestionGate;
use crate::api::middleware::tracing;
use crate::config::RateLimitSettings;
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState, limits: &RateLimitSettings) -> Router {
    let create_gate = Arc::new(IngestionGate::new(
        limits.create_limit,
        limits.create_window,
    ));
    let read_gate = Arc::new(IngestionGate::new(limits.read_limit, limits.read_window));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api::routes::api_routes(create_gate, read_gate))
        .route("/{slug}", get(redirect_handler))
        .with_state(state)
        .layer(tracing::layer())
}
