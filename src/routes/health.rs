//! Health check endpoint for container orchestration.
//!
//! Provides a simple liveness probe that returns 200 OK when the process is running.
//! Used by Docker, Kubernetes, and load balancers to verify the service is alive.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Body of every health response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

impl HealthStatus {
    pub const OK: HealthStatus = HealthStatus { status: "ok" };
}

/// Health check handler.
///
/// Returns `{"status": "ok"}`. This is a liveness probe: it only checks that
/// the process can respond to HTTP, so it takes no input and touches no state.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthStatus::OK))
}
