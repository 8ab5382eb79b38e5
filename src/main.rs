//! heartbeat: a minimal liveness service.
//!
//! This is the application entry point. It loads the `.env` file and
//! configuration, initializes tracing, builds the Axum router and serves it
//! until SIGTERM/SIGINT. With `--healthcheck` it instead probes a running
//! instance and exits.

use std::process::ExitCode;

use clap::Parser;

use heartbeat::config::AppConfig;
use heartbeat::{create_router, http, logging, probe, Error};

/// heartbeat: a minimal HTTP liveness service
#[derive(Parser, Debug)]
#[command(name = "heartbeat", version, about)]
struct Args {
    /// Path to configuration file (default: config/default.toml when present)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level filter (e.g., "heartbeat=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Probe the local health endpoint and exit 0 if healthy, 1 otherwise
    #[arg(long)]
    healthcheck: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("heartbeat: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, Error> {
    // A missing .env file is the normal case outside development
    let _ = dotenvy::dotenv();

    let config = AppConfig::resolve(args.config.as_deref())?;

    if args.healthcheck {
        let healthy = probe::check(&probe::probe_url(&config)?).await?;
        return Ok(if healthy {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let log_filter = logging::resolve_filter(args.log_level, std::env::var("RUST_LOG").ok());
    logging::init_tracing(&log_filter, config.logging.log_format()?);

    tracing::info!(
        config = ?args.config,
        host = %config.http.host,
        port = config.http.port,
        health_path = %config.health.path,
        "Loaded configuration"
    );

    let app = create_router(&config.health);
    http::start_server(app, &config.http).await?;

    Ok(ExitCode::SUCCESS)
}
