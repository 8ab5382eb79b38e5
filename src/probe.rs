//! Self-probe for container `HEALTHCHECK`.
//!
//! `heartbeat --healthcheck` hits the local health route and exits 0 on a
//! 2xx answer, so the image needs no curl or wget.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use crate::config::{AppConfig, ConfigError};

/// Upper bound on a single probe request
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// URL of the health route for the given configuration.
///
/// Dials the configured host, or loopback of the same family when the
/// server binds the unspecified address.
pub fn probe_url(config: &AppConfig) -> Result<String, ConfigError> {
    let addr = config.http.socket_addr()?;
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    Ok(format!(
        "http://{}{}",
        SocketAddr::new(ip, addr.port()),
        config.health.path
    ))
}

/// Issue one GET against `url` and report whether it answered 2xx.
///
/// Connection failures and timeouts count as unhealthy rather than errors;
/// only failing to build the client is an error.
pub async fn check(url: &str) -> Result<bool, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build()?;

    match client.get(url).send().await {
        Ok(response) => {
            tracing::debug!(%url, status = response.status().as_u16(), "Probe answered");
            Ok(response.status().is_success())
        }
        Err(e) => {
            tracing::debug!(%url, error = %e, "Probe failed");
            Ok(false)
        }
    }
}
