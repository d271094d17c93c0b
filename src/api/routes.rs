//! API route configuration.
//!
//! Two quota groups, each behind its own keyed gate: creation-side
//! endpoints (link creation, on-demand analysis) and analytics reads.
//! `/urls` carries one method from each group, so the gates are attached
//! per handler rather than per sub-router.

use std::sync::Arc;

use axum::{
    Router,
    handler::Handler,
    middleware,
    routing::{get, post},
};

use crate::api::handlers::{
    analytics_handler, analyze_handler, links_handler, profile_handler, shorten_handler,
};
use crate::api::middleware::rate_limit::{IngestionGate, gate_middleware};
use crate::state::AppState;

/// All `/api` routes.
///
/// # Endpoints
///
/// - `POST /urls`              - Create a short link
/// - `GET  /urls`              - List the caller's links
/// - `POST /profile/analyze`   - Refresh the caller's naming profile now
/// - `GET  /analytics/{slug}`  - Analytics rollup for a link
/// - `GET  /profile`           - The caller's naming profile
pub fn api_routes(
    create_gate: Arc<IngestionGate>,
    read_gate: Arc<IngestionGate>,
) -> Router<AppState> {
    let create = middleware::from_fn_with_state(create_gate, gate_middleware);
    let read = middleware::from_fn_with_state(read_gate, gate_middleware);

    Router::new()
        .route(
            "/urls",
            post(shorten_handler.layer(create.clone())).get(links_handler.layer(read.clone())),
        )
        .route("/profile/analyze", post(analyze_handler.layer(create)))
        .route(
            "/analytics/{slug}",
            get(analytics_handler.layer(read.clone())),
        )
        .route("/profile", get(profile_handler.layer(read)))
}
