// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// How long a graceful shutdown waits for in-flight connections before
/// giving up and returning anyway.
const FORCE_EXIT_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Binds a TCP listener and dispatches each accepted connection to
/// `handler`, until `shutdown` is cancelled.
pub struct Supervisor {
    listener: TcpListener,
    shutdown: CancellationToken,
}

impl Supervisor {
    pub async fn bind(addr: &str, shutdown: CancellationToken) -> Result<Self, SupervisorError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| SupervisorError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self { listener, shutdown })
    }

    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves connections with `handler`, spawning one task per
    /// connection. On shutdown, stops accepting new connections and waits
    /// up to [`FORCE_EXIT_DEADLINE`] for in-flight tasks before returning.
    pub async fn run<F, Fut>(self, handler: F)
    where
        F: Fn(TcpStream) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let tasks = tokio_util::task::TaskTracker::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            debug!(%addr, "accepted connection");
                            let handler = Arc::clone(&handler);
                            tasks.spawn(async move {
                                handler(stream).await;
                            });
                        }
                        Err(e) => error!(error = %e, "accept failed"),
                    }
                }
                _ = self.shutdown.cancelled() => {
                    info!("supervisor shutting down, no longer accepting connections");
                    break;
                }
            }
        }

        tasks.close();
        if timeout(FORCE_EXIT_DEADLINE, tasks.wait()).await.is_err() {
            info!("force-exit deadline reached with connections still in flight");
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod supervisor_tests;
