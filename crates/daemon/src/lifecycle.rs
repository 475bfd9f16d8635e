// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process lifecycle: acquire the workdir's PID lock, resolve [`Flags`]
//! into a running server, and serve either in listen mode (bind and
//! accept) or reverse mode (dial the coordinator and serve that one
//! connection), until `shutdown` is cancelled.

use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::middleware::{self, Next};
use fs2::FileExt;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_rustls::{rustls, TlsAcceptor};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use buildlet_core::{Config, Platform, WorkdirError};
use buildlet_net::{
    dial, handshake_tls, send_upgrade_request, DialError, ReverseListener, ReverseListenerError,
    Supervisor, SupervisorError, UpgradeRequest,
};

use crate::config::{resolve, ResolveError};
use crate::env::PROTOCOL_VERSION;
use crate::flags::Flags;
use crate::http::router;
use crate::http_serve::serve_connection;
use crate::state::AppState;

const KEEPALIVE_PERIOD: Duration = Duration::from_secs(180);

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("another buildletd instance is already running (lock held at {0})")]
    AlreadyRunning(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Workdir(#[from] WorkdirError),
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
    #[error(transparent)]
    Dial(#[from] DialError),
    #[error("reverse mode requires --tls-cert naming the coordinator's CA")]
    MissingCoordinatorCa,
    #[error("invalid TLS material: {0}")]
    Tls(String),
    #[error(transparent)]
    ReverseListener(#[from] ReverseListenerError),
    #[error("reverse connection to the coordinator was lost")]
    ReverseDisconnected,
}

/// Holds the workdir-scoped PID lock for the process's lifetime. The
/// `fs2` advisory lock is released by the OS on process exit regardless,
/// but dropping this explicitly keeps repeated acquire/release cycles
/// honest within a single test process.
struct PidLock {
    file: File,
    path: PathBuf,
}

impl PidLock {
    /// Mirrors the ordering that matters here: open without truncating,
    /// acquire the lock, and only then truncate and write our PID -- so a
    /// losing acquisition attempt never clobbers the winner's PID file.
    fn acquire(workdir: &Path) -> Result<Self, LifecycleError> {
        std::fs::create_dir_all(workdir)?;
        let path = workdir.join("buildletd.lock");
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.try_lock_exclusive()
            .map_err(|_| LifecycleError::AlreadyRunning(path.clone()))?;

        let mut file = file;
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        Ok(PidLock { file, path })
    }
}

impl Drop for PidLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Resolves `flags`, acquires the lock, and serves until `shutdown` is
/// cancelled. Cleans up the lock and any directories it created on
/// failure -- except when the failure was the lock acquisition itself,
/// since those files belong to the instance that is already running.
pub async fn run(flags: Flags, shutdown: CancellationToken) -> Result<(), LifecycleError> {
    let listen = flags.listen.clone();
    let proxy = flags.proxy.clone();
    let config = resolve(flags)?;

    // A failed acquisition here means another instance holds the lock --
    // its files are not ours to touch, so we return without cleanup.
    let lock = PidLock::acquire(&config.workdir)?;

    // Past this point we own the lock file; any failure below tears it
    // down via `PidLock`'s `Drop` impl.
    let result = run_inner(&config, listen.as_deref(), proxy.as_deref(), shutdown).await;
    drop(lock);
    result
}

async fn run_inner(
    config: &Config,
    listen: Option<&str>,
    proxy: Option<&str>,
    shutdown: CancellationToken,
) -> Result<(), LifecycleError> {
    buildlet_core::Workdir::new(config.workdir.clone()).ensure()?;

    let state = AppState::new(config.clone(), Platform::host(), shutdown.clone());
    let router = router(state);

    if config.reverse {
        let coordinator = config
            .coordinator_addr
            .clone()
            .ok_or(ResolveError::MissingCoordinator)?;
        run_reverse(&coordinator, proxy, config, router, shutdown).await
    } else {
        let tls_acceptor = build_tls_acceptor(config)?;
        run_listen(listen, tls_acceptor, router, shutdown).await
    }
}

fn resolve_listen_addr(listen: Option<&str>, tls: bool) -> String {
    match listen {
        Some(addr) if addr != "AUTO" => addr.to_string(),
        _ => {
            if tls {
                "0.0.0.0:443".to_string()
            } else {
                "0.0.0.0:80".to_string()
            }
        }
    }
}

fn build_tls_acceptor(config: &Config) -> Result<Option<TlsAcceptor>, LifecycleError> {
    let (cert_bytes, key_bytes) = match (&config.tls_cert, &config.tls_key) {
        (Some(cert), Some(key)) => (cert, key),
        _ => return Ok(None),
    };

    let certs = parse_certs(cert_bytes)?;
    let key = parse_private_key(key_bytes)?;

    let server_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| LifecycleError::Tls(e.to_string()))?;

    Ok(Some(TlsAcceptor::from(Arc::new(server_config))))
}

fn parse_certs(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, LifecycleError> {
    rustls_pemfile::certs(&mut &pem[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| LifecycleError::Tls(e.to_string()))
}

fn parse_private_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>, LifecycleError> {
    rustls_pemfile::private_key(&mut &pem[..])
        .map_err(|e| LifecycleError::Tls(e.to_string()))?
        .ok_or_else(|| LifecycleError::Tls("no private key found in --tls-key".to_string()))
}

async fn run_listen(
    listen: Option<&str>,
    tls: Option<TlsAcceptor>,
    router: axum::Router,
    shutdown: CancellationToken,
) -> Result<(), LifecycleError> {
    let addr = resolve_listen_addr(listen, tls.is_some());
    let supervisor = Supervisor::bind(&addr, shutdown).await?;
    info!(%addr, tls = tls.is_some(), "listening");

    supervisor
        .run(move |stream| {
            let router = router.clone();
            let tls = tls.clone();
            async move {
                enable_keepalive(&stream);
                match tls {
                    Some(acceptor) => match acceptor.accept(stream).await {
                        Ok(tls_stream) => serve_connection(tls_stream, router).await,
                        Err(e) => warn!(error = %e, "TLS handshake failed"),
                    },
                    None => serve_connection(stream, router).await,
                }
            }
        })
        .await;
    Ok(())
}

/// Enables a 3-minute TCP keepalive on an accepted connection so idle
/// long-poll builders don't get silently dropped by stateful middleboxes.
fn enable_keepalive(stream: &TcpStream) {
    let sock = socket2::SockRef::from(stream);
    let keepalive = socket2::TcpKeepalive::new().with_time(KEEPALIVE_PERIOD);
    if let Err(e) = sock.set_tcp_keepalive(&keepalive) {
        warn!(error = %e, "failed to enable TCP keepalive");
    }
}

/// Dials the coordinator, optionally through `proxy`, performs the
/// reverse-mode TLS handshake and upgrade handshake, then serves that one
/// connection until it disconnects, goes idle, or `shutdown` fires.
///
/// There is no redial: loss of this connection is fatal, so every path out
/// of the `select!` below other than a clean shutdown returns an error,
/// which `run`/`main` turn into a non-zero process exit.
///
/// TLS is required here: `--tls-cert` is reused as the CA that
/// authenticates the coordinator (there is no platform trust-store crate
/// in this workspace to fall back to).
async fn run_reverse(
    coordinator: &str,
    proxy: Option<&str>,
    config: &Config,
    router: axum::Router,
    shutdown: CancellationToken,
) -> Result<(), LifecycleError> {
    let ca_pem = config
        .tls_cert
        .as_deref()
        .ok_or(LifecycleError::MissingCoordinatorCa)?;

    if shutdown.is_cancelled() {
        return Ok(());
    }

    let tcp = dial(coordinator, proxy).await?;
    let server_name = coordinator
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or(coordinator);

    let tls_config = client_tls_config(ca_pem)?;
    let mut tls_stream = handshake_tls(tcp, server_name, tls_config).await?;

    let upgrade = UpgradeRequest {
        host_type: config.host_type.clone(),
        builder_key: config.password.clone().unwrap_or_default(),
        builder_hostname: local_hostname(),
        builder_version: PROTOCOL_VERSION.to_string(),
    };
    send_upgrade_request(&mut tls_stream, &upgrade).await?;
    info!(%coordinator, "reverse connection established");

    // The dialed stream is seeded into a `ReverseListener` rather than
    // handed straight to `serve_connection`: the first `accept` below
    // hands it right back, but the listener's idle clock -- touched by
    // the middleware on every request -- lets a second, concurrent
    // `accept` detect a connection that has gone quiet and close it.
    let listener = Arc::new(ReverseListener::new(tls_stream));
    let (stream, _addr) = listener.accept().await?;

    let touch_listener = Arc::clone(&listener);
    let router = router.layer(middleware::from_fn(
        move |request: Request, next: Next| {
            let touch_listener = Arc::clone(&touch_listener);
            async move {
                touch_listener.touch().await;
                next.run(request).await
            }
        },
    ));

    let watchdog = Arc::clone(&listener);
    tokio::select! {
        () = serve_connection(stream, router) => {
            warn!(%coordinator, "reverse connection ended");
        }
        watchdog_result = watchdog.accept() => {
            if let Err(e) = watchdog_result {
                warn!(%coordinator, error = %e, "reverse connection watchdog fired");
            }
        }
        () = shutdown.cancelled() => return Ok(()),
    }

    if shutdown.is_cancelled() {
        return Ok(());
    }
    Err(LifecycleError::ReverseDisconnected)
}

fn client_tls_config(ca_pem: &[u8]) -> Result<Arc<rustls::ClientConfig>, LifecycleError> {
    let mut roots = rustls::RootCertStore::empty();
    for cert in parse_certs(ca_pem)? {
        roots
            .add(cert)
            .map_err(|e| LifecycleError::Tls(e.to_string()))?;
    }
    let config = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(Arc::new(config))
}

fn local_hostname() -> String {
    std::process::Command::new("hostname")
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod lifecycle_tests;
