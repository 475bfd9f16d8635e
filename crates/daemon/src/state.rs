// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use buildlet_core::{Config, Platform, Workdir};

/// Shared, cloneable handle every HTTP handler receives. Cloning is cheap:
/// everything mutable lives behind the `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    workdir: Workdir,
    platform: Platform,
    started_at: Instant,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, platform: Platform, shutdown: CancellationToken) -> Self {
        let workdir = Workdir::new(config.workdir.clone());
        AppState {
            inner: Arc::new(Inner {
                config,
                workdir,
                platform,
                started_at: Instant::now(),
                shutdown,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn workdir(&self) -> &Workdir {
        &self.inner.workdir
    }

    pub fn platform(&self) -> Platform {
        self.inner.platform
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.inner.started_at.elapsed()
    }

    pub fn shutdown(&self) -> &CancellationToken {
        &self.inner.shutdown
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;
