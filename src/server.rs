//! Gateway lifecycle
//!
//! `starting → serving → draining → stopped`: bind the listener, serve on a
//! background task, wait for SIGINT/SIGTERM, then drain in-flight requests
//! within a bounded timeout.

use std::io;
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use anyhow::Context;
use axum_server::Handle;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::tasks::spawn_cleanup_task;
use crate::tls::TlsProvisioner;

/// How the drain phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight request finished in time
    Drained,
    /// The timeout elapsed and remaining connections were dropped
    TimedOut,
}

/// Runs the gateway until a termination signal arrives.
///
/// Bind and certificate errors are returned before anything is served.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config);
    info!("Cache store initialized");

    let provisioner = TlsProvisioner::from_mode(&config.tls).await?;
    let app = create_router(state.clone(), provisioner.challenge_router());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = TcpListener::bind(addr).with_context(|| format!("failed to bind {addr}"))?;
    let challenge_listener = provisioner.spawn_challenge_listener().await?;

    let cleanup_handle = spawn_cleanup_task(state.cache.clone(), config.cleanup_interval);
    info!("Background cleanup task started");

    info!(
        "Listening on {}://{} ({})",
        if provisioner.is_tls() { "https" } else { "http" },
        addr,
        provisioner.describe()
    );

    let handle = Handle::new();
    let mut server = tokio::spawn(provisioner.serve(listener, app, handle.clone()));

    let stopped_early = tokio::select! {
        _ = shutdown_signal() => None,
        result = &mut server => Some(result),
    };

    cleanup_handle.abort();
    if let Some(challenge) = challenge_listener {
        challenge.abort();
    }

    if let Some(result) = stopped_early {
        return match result {
            Ok(Ok(())) => {
                warn!("Server exited without a shutdown signal");
                Ok(())
            }
            Ok(Err(err)) => Err(err).context("server failed"),
            Err(err) => Err(err).context("server task panicked"),
        };
    }

    info!("Shutdown with timeout: {:?}", config.shutdown_timeout);
    handle.graceful_shutdown(None);

    match drain(server, config.shutdown_timeout).await {
        ShutdownOutcome::Drained => info!("Server stopped"),
        ShutdownOutcome::TimedOut => warn!(
            "Shutdown timed out after {:?}, dropping remaining connections",
            config.shutdown_timeout
        ),
    }

    Ok(())
}

/// Waits for the server task to finish, at most `timeout`.
///
/// On timeout the task is aborted, which closes whatever is still open.
pub async fn drain(mut server: JoinHandle<io::Result<()>>, timeout: Duration) -> ShutdownOutcome {
    match tokio::time::timeout(timeout, &mut server).await {
        Ok(Ok(Ok(()))) => ShutdownOutcome::Drained,
        Ok(Ok(Err(err))) => {
            error!("Server error during shutdown: {}", err);
            ShutdownOutcome::Drained
        }
        Ok(Err(err)) => {
            error!("Server task failed during shutdown: {}", err);
            ShutdownOutcome::Drained
        }
        Err(_) => {
            server.abort();
            ShutdownOutcome::TimedOut
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    #[tokio::test]
    async fn test_drain_finished_server() {
        let server = tokio::spawn(async { Ok(()) });

        let outcome = drain(server, Duration::from_secs(1)).await;
        assert_eq!(outcome, ShutdownOutcome::Drained);
    }

    #[tokio::test]
    async fn test_drain_times_out() {
        let server = tokio::spawn(async {
            std::future::pending::<()>().await;
            Ok(())
        });

        let outcome = drain(server, Duration::from_millis(50)).await;
        assert_eq!(outcome, ShutdownOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_graceful_shutdown_of_live_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let state = AppState::new(MemoryStore::with_capacity_mib(1), "");
        let app = create_router(state, None);

        let handle = Handle::new();
        let server = tokio::spawn(TlsProvisioner::plain().serve(listener, app, handle.clone()));

        let response = reqwest::Client::new()
            .put(format!("http://{addr}/items/lifecycle"))
            .body("alive")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        handle.graceful_shutdown(None);
        let outcome = drain(server, Duration::from_secs(5)).await;
        assert_eq!(outcome, ShutdownOutcome::Drained);

        // New connections are refused once stopped
        let refused = reqwest::Client::new()
            .get(format!("http://{addr}/items/lifecycle"))
            .send()
            .await;
        assert!(refused.is_err());
    }
}
