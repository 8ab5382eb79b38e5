//! Configuration loading and constants.
//!
//! Loads application configuration from a TOML file, applies environment
//! overrides, and validates the result. Every field has a default so the
//! service runs with no file at all. `AppConfig` is the root configuration
//! struct containing all settings.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use const_format::formatcp;
use serde::Deserialize;

// =============================================================================
// Defaults
// =============================================================================

/// Default bind address (all interfaces, as inside a container)
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default bind port, matching the port exposed by the container image
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Seconds to wait for in-flight requests after a shutdown signal
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default route path of the liveness probe
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// Liveness answers must never be served from a cache
pub const CACHE_CONTROL_HEALTH: &str = "no-store";

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "heartbeat=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

// =============================================================================
// Environment overrides
// =============================================================================

const ENV_PREFIX: &str = "HEARTBEAT_";

pub const ENV_HOST: &str = formatcp!("{}HOST", ENV_PREFIX);
pub const ENV_PORT: &str = formatcp!("{}PORT", ENV_PREFIX);
pub const ENV_HEALTH_PATH: &str = formatcp!("{}HEALTH_PATH", ENV_PREFIX);
pub const ENV_LOG_FORMAT: &str = formatcp!("{}LOG_FORMAT", ENV_PREFIX);

/// Conventional port variable set by most container platforms
pub const ENV_PORT_FALLBACK: &str = "PORT";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Liveness probe configuration
    #[serde(default)]
    pub health: HealthConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
    /// Drain window for graceful shutdown
    #[serde(default = "HttpServerConfig::default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            shutdown_timeout_seconds: Self::default_shutdown_timeout(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }

    fn default_shutdown_timeout() -> u64 {
        DEFAULT_SHUTDOWN_TIMEOUT_SECS
    }

    /// Resolve host and port into a socket address.
    ///
    /// The host is a bare IPv4 or IPv6 address (`0.0.0.0`, `::`, `::1`).
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.trim().parse().map_err(|e| {
            ConfigError::Validation(format!("Invalid http.host '{}': {}", self.host, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "HealthConfig::default_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

impl HealthConfig {
    fn default_path() -> String {
        DEFAULT_HEALTH_PATH.to_string()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Validation(format!(
                "Unknown logging.format '{}': expected \"text\" or \"json\"",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn log_format(&self) -> Result<LogFormat, ConfigError> {
        self.format.parse()
    }
}

impl AppConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration the binary runs with.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present, otherwise built-in defaults. Process environment overrides
    /// are applied last.
    pub fn resolve(explicit: Option<&str>) -> Result<Self, ConfigError> {
        Self::resolve_with(explicit, Path::new(DEFAULT_CONFIG_PATH), |key| {
            std::env::var(key).ok()
        })
    }

    /// [`AppConfig::resolve`] with the fallback file and environment supplied
    /// by the caller.
    pub fn resolve_with<F>(
        explicit: Option<&str>,
        default_path: &Path,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None if default_path.exists() => Self::load(default_path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(lookup)?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`, then re-validate.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.http.host = host;
        }

        if let Some(port) = lookup(ENV_PORT).or_else(|| lookup(ENV_PORT_FALLBACK)) {
            self.http.port = port.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("Invalid port in environment: '{}'", port))
            })?;
        }

        if let Some(path) = lookup(ENV_HEALTH_PATH) {
            self.health.path = path;
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = format;
        }

        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let path = &self.health.path;
        if !path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "health.path must start with '/': '{}'",
                path
            )));
        }
        if path.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "health.path must not contain whitespace: '{}'",
                path
            )));
        }
        if path.contains(['{', '}', '*', ':']) {
            return Err(ConfigError::Validation(format!(
                "health.path must be a literal path without captures or wildcards: '{}'",
                path
            )));
        }

        self.logging.log_format()?;
        self.http.socket_addr()?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 8000);
        assert_eq!(config.http.shutdown_timeout_seconds, 30);
        assert_eq!(config.health.path, "/health");
        assert_eq!(config.logging.log_format().unwrap(), LogFormat::Text);
        assert_eq!(
            config.http.socket_addr().unwrap(),
            "0.0.0.0:8000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
[http]
host = "127.0.0.1"
port = 9090
shutdown_timeout_seconds = 5

[health]
path = "/healthz"

[logging]
format = "json"
"#,
        );

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.http.shutdown_timeout_seconds, 5);
        assert_eq!(config.health.path, "/healthz");
        assert_eq!(config.logging.log_format().unwrap(), LogFormat::Json);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let file = write_config("[http]\nport = 3000\n");

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.health.path, DEFAULT_HEALTH_PATH);
        assert_eq!(config.logging.format, DEFAULT_LOG_FORMAT);
    }

    #[test]
    fn test_load_empty_file() {
        let file = write_config("");
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/heartbeat.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = write_config("[http\nport = ");
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_health_path_must_start_with_slash() {
        let file = write_config("[health]\npath = \"health\"\n");
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_health_path_rejects_whitespace() {
        let file = write_config("[health]\npath = \"/he alth\"\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_health_path_rejects_captures() {
        let file = write_config("[health]\npath = \"/{probe}\"\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_log_format() {
        let file = write_config("[logging]\nformat = \"xml\"\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_log_format_is_case_insensitive() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Text".parse::<LogFormat>().unwrap(), LogFormat::Text);
    }

    #[test]
    fn test_invalid_host() {
        let file = write_config("[http]\nhost = \"not a host\"\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_ipv6_hosts() {
        let config = HttpServerConfig {
            host: "::".to_string(),
            ..HttpServerConfig::default()
        };
        assert_eq!(
            config.socket_addr().unwrap(),
            "[::]:8000".parse::<SocketAddr>().unwrap()
        );

        let file = write_config("[http]\nhost = \"::1\"\nport = 9000\n");
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(
            config.http.socket_addr().unwrap(),
            "[::1]:9000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_resolve_explicit_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let err = AppConfig::resolve_with(
            Some(missing.to_str().unwrap()),
            &dir.path().join(DEFAULT_CONFIG_PATH),
            env(&[]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_resolve_without_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config =
            AppConfig::resolve_with(None, &dir.path().join(DEFAULT_CONFIG_PATH), env(&[]))
                .unwrap();
        assert_eq!(config.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
        assert_eq!(config.health.path, DEFAULT_HEALTH_PATH);
    }

    #[test]
    fn test_resolve_loads_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let default_path = dir.path().join(DEFAULT_CONFIG_PATH);
        std::fs::create_dir_all(default_path.parent().unwrap()).unwrap();
        std::fs::write(&default_path, "[http]\nport = 8123\n[health]\npath = \"/up\"\n").unwrap();

        let config = AppConfig::resolve_with(None, &default_path, env(&[])).unwrap();
        assert_eq!(config.http.port, 8123);
        assert_eq!(config.health.path, "/up");
    }

    #[test]
    fn test_resolve_env_overrides_file() {
        let file = write_config("[http]\nport = 8123\n");

        let config = AppConfig::resolve_with(
            Some(file.path().to_str().unwrap()),
            Path::new(DEFAULT_CONFIG_PATH),
            env(&[(ENV_PORT, "9001")]),
        )
        .unwrap();
        assert_eq!(config.http.port, 9001);
    }

    #[test]
    fn test_dotenv_values_reach_overrides() {
        let mut dotenv = tempfile::NamedTempFile::new().unwrap();
        writeln!(dotenv, "# local overrides").unwrap();
        writeln!(dotenv, "{}=8088", ENV_PORT).unwrap();
        writeln!(dotenv, "{}=/ready", ENV_HEALTH_PATH).unwrap();

        let vars: HashMap<String, String> = dotenvy::from_path_iter(dotenv.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| vars.get(key).cloned())
            .unwrap();
        assert_eq!(config.http.port, 8088);
        assert_eq!(config.health.path, "/ready");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                (ENV_HOST, "127.0.0.1"),
                (ENV_PORT, "8081"),
                (ENV_HEALTH_PATH, "/livez"),
                (ENV_LOG_FORMAT, "json"),
            ]))
            .unwrap();

        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 8081);
        assert_eq!(config.health.path, "/livez");
        assert_eq!(config.logging.log_format().unwrap(), LogFormat::Json);
    }

    #[test]
    fn test_env_port_fallback() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[(ENV_PORT_FALLBACK, "5000")]))
            .unwrap();
        assert_eq!(config.http.port, 5000);
    }

    #[test]
    fn test_env_prefixed_port_wins_over_fallback() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[(ENV_PORT, "7000"), (ENV_PORT_FALLBACK, "5000")]))
            .unwrap();
        assert_eq!(config.http.port, 7000);
    }

    #[test]
    fn test_env_invalid_port() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(env(&[(ENV_PORT, "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_env_invalid_health_path() {
        let mut config = AppConfig::default();
        assert!(config
            .apply_env_overrides(env(&[(ENV_HEALTH_PATH, "status")]))
            .is_err());
    }

    #[test]
    fn test_no_env_leaves_config_unchanged() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env(&[])).unwrap();
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
        assert_eq!(config.health.path, DEFAULT_HEALTH_PATH);
    }
}
