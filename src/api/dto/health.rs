//! DTOs for the health check endpoint.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub click_queue: QueueHealth,
}

#[derive(Debug, Serialize)]
pub struct QueueHealth {
    pub capacity: usize,
    pub in_flight: usize,
}
