//! heartbeat: a minimal HTTP service exposing a liveness probe.
//!
//! The library holds everything the binary wires together, so integration
//! tests can build the same router and server the process runs.

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod probe;
pub mod routes;

pub use config::AppConfig;
pub use error::Error;
pub use routes::create_router;
