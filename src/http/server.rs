//! HTTP server startup logic.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;

use crate::config::HttpServerConfig;

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind server: {0}")]
    Bind(#[source] io::Error),

    #[error("Server error: {0}")]
    Server(#[source] io::Error),
}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::AddrInUse
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::PermissionDenied => ServerError::Bind(err),
            _ => ServerError::Server(err),
        }
    }
}

/// Start the HTTP server based on configuration.
///
/// Installs the shutdown signal handler and blocks until the server has
/// drained and stopped.
pub async fn start_server(app: Router, config: &HttpServerConfig) -> Result<(), ServerError> {
    let addr = config
        .socket_addr()
        .map_err(|e| ServerError::InvalidAddress(e.to_string()))?;

    let handle = Handle::new();
    shutdown::setup_shutdown_handler(
        handle.clone(),
        Duration::from_secs(config.shutdown_timeout_seconds),
    );

    serve(app, addr, handle).await
}

/// Serve `app` on `addr` until `handle` shuts the server down.
///
/// The bound address (useful when binding port 0) is available through
/// [`Handle::listening`].
pub async fn serve(app: Router, addr: SocketAddr, handle: Handle) -> Result<(), ServerError> {
    tracing::info!(%addr, "Starting HTTP server");

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
