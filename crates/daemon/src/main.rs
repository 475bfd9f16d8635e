// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for `buildletd`: parses flags, wires up logging, and hands
//! off to [`buildlet_daemon::lifecycle::run`] until a shutdown signal
//! arrives.

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use buildlet_daemon::{lifecycle, Flags};

#[tokio::main]
async fn main() {
    let flags = Flags::parse();
    let _log_guard = init_logging();

    let shutdown = CancellationToken::new();
    spawn_signal_watcher(shutdown.clone());

    info!(version = env!("CARGO_PKG_VERSION"), "starting buildletd");
    if let Err(e) = lifecycle::run(flags, shutdown).await {
        error!(error = %e, "buildletd exited with an error");
        std::process::exit(1);
    }
}

/// Logs to `BUILDLET_LOG_DIR` (daily-rolled) if set, else stderr. Returns
/// the appender's flush guard, which must stay alive for the process
/// lifetime -- dropping it early silently truncates buffered log lines.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match buildlet_daemon::env::log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(&dir, "buildletd.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

/// Cancels `shutdown` on SIGTERM or Ctrl-C, either of which should drive
/// the same graceful teardown `/halt` triggers.
fn spawn_signal_watcher(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut terminate) => {
                    tokio::select! {
                        _ = ctrl_c => {}
                        _ = terminate.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to install SIGTERM handler");
                    let _ = ctrl_c.await;
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
        }

        shutdown.cancel();
    });
}
