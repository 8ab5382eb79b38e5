use crate::config::ConfigError;
use crate::http::ServerError;

/// Fatal startup and runtime errors surfaced by the binary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("Health probe failed: {0}")]
    Probe(#[from] reqwest::Error),
}
