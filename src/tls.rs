//! TLS Provisioning
//!
//! Turns the configured [`TlsMode`] into a listener flavour: plain HTTP,
//! a static PEM certificate, or certificates issued on demand over ACME.
//! In ACME mode the provisioner also answers HTTP-01 challenges under
//! `/.well-known/acme-challenge/`.

use std::io;
use std::net::{SocketAddr, TcpListener};

use anyhow::Context;
use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use futures::StreamExt;
use rustls_acme::{
    axum::AxumAcceptor, caches::DirCache, tower::TowerHttp01ChallengeService, AcmeConfig,
    UseChallenge,
};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{AcmeSettings, TlsMode};

enum Listener {
    Plain,
    Static(RustlsConfig),
    Acme {
        acceptor: AxumAcceptor,
        challenge: TowerHttp01ChallengeService,
        challenge_port: Option<u16>,
        events: JoinHandle<()>,
    },
}

/// Certificate source for the gateway listener.
pub struct TlsProvisioner {
    listener: Listener,
}

impl TlsProvisioner {
    /// Prepares the provisioner for `mode`.
    ///
    /// Static certificates are loaded here, so a missing or malformed file
    /// fails startup. ACME certificates are ordered lazily in the background.
    pub async fn from_mode(mode: &TlsMode) -> anyhow::Result<Self> {
        let listener = match mode {
            TlsMode::Plain => Listener::Plain,
            TlsMode::Static { cert, key } => {
                install_crypto_provider();
                let config = RustlsConfig::from_pem_file(cert, key)
                    .await
                    .with_context(|| {
                        format!(
                            "failed to load TLS certificate {} / key {}",
                            cert.display(),
                            key.display()
                        )
                    })?;
                Listener::Static(config)
            }
            TlsMode::Acme(settings) => {
                install_crypto_provider();
                start_acme(settings)
            }
        };

        Ok(Self { listener })
    }

    /// Plain HTTP provisioner.
    pub fn plain() -> Self {
        Self {
            listener: Listener::Plain,
        }
    }

    pub fn is_tls(&self) -> bool {
        !matches!(self.listener, Listener::Plain)
    }

    /// Human readable listener flavour for logs.
    pub fn describe(&self) -> &'static str {
        match self.listener {
            Listener::Plain => "plain HTTP",
            Listener::Static(_) => "TLS, static certificate",
            Listener::Acme { .. } => "TLS, ACME certificate",
        }
    }

    /// Routes answering ACME HTTP-01 challenges, in ACME mode only.
    pub fn challenge_router(&self) -> Option<Router> {
        match &self.listener {
            Listener::Acme { challenge, .. } => Some(Router::new().route_service(
                "/.well-known/acme-challenge/:challenge_token",
                challenge.clone(),
            )),
            _ => None,
        }
    }

    /// Starts the extra plain-HTTP challenge listener when one is configured.
    pub async fn spawn_challenge_listener(&self) -> anyhow::Result<Option<JoinHandle<()>>> {
        let port = match &self.listener {
            Listener::Acme {
                challenge_port: Some(port),
                ..
            } => *port,
            _ => return Ok(None),
        };
        let Some(router) = self.challenge_router() else {
            return Ok(None);
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind ACME challenge listener on {addr}"))?;
        info!("ACME challenge listener on http://{}", addr);

        Ok(Some(tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router).await {
                error!("ACME challenge listener failed: {}", err);
            }
        })))
    }

    /// Serves `app` on `listener` until `handle` shuts the server down.
    pub async fn serve(self, listener: TcpListener, app: Router, handle: Handle) -> io::Result<()> {
        listener.set_nonblocking(true)?;
        let service = app.into_make_service();

        match self.listener {
            Listener::Plain => {
                axum_server::from_tcp(listener)
                    .handle(handle)
                    .serve(service)
                    .await
            }
            Listener::Static(config) => {
                axum_server::from_tcp_rustls(listener, config)
                    .handle(handle)
                    .serve(service)
                    .await
            }
            Listener::Acme {
                acceptor, events, ..
            } => {
                let result = axum_server::from_tcp(listener)
                    .acceptor(acceptor)
                    .handle(handle)
                    .serve(service)
                    .await;
                events.abort();
                result
            }
        }
    }
}

/// Builds the ACME state machine and drives it on a background task that
/// logs its events.
fn start_acme(settings: &AcmeSettings) -> Listener {
    let mut state = AcmeConfig::new(settings.hosts.iter().map(String::as_str))
        .contact(settings.contact.iter().map(|email| format!("mailto:{email}")))
        .cache(DirCache::new(settings.cache_dir.clone()))
        .directory_lets_encrypt(!settings.staging)
        .challenge_type(UseChallenge::Http01)
        .state();

    let acceptor = state.axum_acceptor(state.default_rustls_config());
    let challenge = state.http01_challenge_tower_service();

    info!(
        hosts = ?settings.hosts,
        cache_dir = %settings.cache_dir.display(),
        staging = settings.staging,
        "ACME certificate provisioning enabled"
    );

    let events = tokio::spawn(async move {
        while let Some(event) = state.next().await {
            match event {
                Ok(ok) => info!("ACME event: {:?}", ok),
                Err(err) => error!("ACME error: {:?}", err),
            }
        }
        warn!("ACME event stream ended");
    });

    Listener::Acme {
        acceptor,
        challenge,
        challenge_port: settings.challenge_port,
        events,
    }
}

/// rustls needs a process-wide crypto provider; a second install is a no-op.
fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}
