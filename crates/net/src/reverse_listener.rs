// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A listener that serves exactly one pre-established connection: the
//! reverse-mode dial to the coordinator. The first accept returns that
//! connection immediately; any later accept blocks until the connection
//! has been idle for a minute, then errors, so the HTTP server's accept
//! loop winds down instead of spinning.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::Mutex;

const IDLE_TIMEOUT: Duration = Duration::from_secs(60);
const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ReverseListenerError {
    #[error("reverse connection idle for over {0:?}")]
    Idle(Duration),
    #[error("reverse connection already consumed")]
    AlreadyConsumed,
}

/// Synthetic peer address reported for the single reverse connection;
/// there is no real local listen address to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseAddr;

impl fmt::Display for ReverseAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reverse")
    }
}

/// `S` is the stream type seeded in -- a raw `TcpStream` for a plain
/// reverse dial, a `tokio_rustls::client::TlsStream<TcpStream>` once the
/// dial has been TLS-wrapped.
pub struct ReverseListener<S> {
    conn: Mutex<Option<S>>,
    consumed: AtomicBool,
    last_activity: Mutex<Instant>,
    idle_timeout: Duration,
}

impl<S> ReverseListener<S> {
    pub fn new(seed: S) -> Self {
        Self::with_idle_timeout(seed, IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(seed: S, idle_timeout: Duration) -> Self {
        Self {
            conn: Mutex::new(Some(seed)),
            consumed: AtomicBool::new(false),
            last_activity: Mutex::new(Instant::now()),
            idle_timeout,
        }
    }

    /// Resets the idle clock; called on every HTTP server connection-state
    /// event (request started, response written, ...).
    pub async fn touch(&self) {
        *self.last_activity.lock().await = Instant::now();
    }

    /// Returns the seeded connection on the first call. On any later call,
    /// blocks until the connection has gone idle and then errors -- the
    /// reverse connection is never accepted twice.
    pub async fn accept(&self) -> Result<(S, ReverseAddr), ReverseListenerError> {
        if !self.consumed.swap(true, Ordering::SeqCst) {
            let conn = self
                .conn
                .lock()
                .await
                .take()
                .ok_or(ReverseListenerError::AlreadyConsumed)?;
            self.touch().await;
            return Ok((conn, ReverseAddr));
        }

        loop {
            tokio::time::sleep(POLL_INTERVAL.min(self.idle_timeout)).await;
            let elapsed = self.last_activity.lock().await.elapsed();
            if elapsed >= self.idle_timeout {
                return Err(ReverseListenerError::Idle(elapsed));
            }
        }
    }
}

#[cfg(test)]
#[path = "reverse_listener_tests.rs"]
mod reverse_listener_tests;
