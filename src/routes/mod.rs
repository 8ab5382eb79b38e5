//! HTTP route handlers.
//!
//! The service registers a single liveness route. Unknown paths fall through
//! to the framework's default 404, and other methods on the health path get
//! the default 405.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod health;

use axum::http::header::{HeaderValue, CACHE_CONTROL};
use axum::{middleware, routing::get, Router};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{HealthConfig, CACHE_CONTROL_HEALTH};
use crate::middleware::request_id_layer;

/// Creates the Axum router with the health route and request ID middleware.
pub fn create_router(health_config: &HealthConfig) -> Router {
    // Health check - no caching, always fresh for liveness probes
    let health_routes = Router::new()
        .route(&health_config.path, get(health::health))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_HEALTH),
        ));

    Router::new()
        .merge(health_routes)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
