//! HTTP server module.
//!
//! The server runs plain HTTP; TLS is expected to terminate at the reverse
//! proxy or ingress in front of the container.
//!
//! The server includes:
//! - Configurable bind address (default `0.0.0.0:8000`)
//! - Graceful shutdown on SIGTERM/SIGINT

mod server;
mod shutdown;

pub use server::{serve, start_server, ServerError};
