//! Cachegate server binary
//!
//! Reads its configuration from the environment and serves until SIGINT or
//! SIGTERM.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cachegate::config::{Config, TlsMode};
use cachegate::server;

#[tokio::main]
async fn main() -> ExitCode {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cachegate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cache gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_size={}MB, port={}, auth={}, tls={}, cleanup_interval={}s",
        config.cache_size_mib,
        config.server_port,
        if config.api_key.is_empty() { "open" } else { "bearer" },
        match &config.tls {
            TlsMode::Plain => "off",
            TlsMode::Static { .. } => "static",
            TlsMode::Acme(_) => "acme",
        },
        config.cleanup_interval
    );

    match server::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
