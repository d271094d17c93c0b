//! Health check handler.

use axum::{Json, extract::State};

use crate::api::dto::health::{HealthResponse, QueueHealth};
use crate::state::AppState;

/// Reports process liveness and click-queue backlog.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let capacity = state.click_queue_capacity;
    let in_flight = capacity.saturating_sub(state.click_tx.capacity());

    Json(HealthResponse {
        status: "ok",
        click_queue: QueueHealth {
            capacity,
            in_flight,
        },
    })
}
