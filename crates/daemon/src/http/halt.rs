// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /halt`: acknowledge immediately, then tear the process down on a
//! delay so the response actually makes it back to the caller first.

use std::time::Duration;

use axum::extract::State;
use tokio::process::Command;

use crate::env::{halt_mode, HaltMode};
use crate::state::AppState;

const TEARDOWN_DELAY: Duration = Duration::from_secs(1);
const WATCHDOG_DELAY: Duration = Duration::from_secs(5);

pub async fn halt(State(state): State<AppState>) -> &'static str {
    let shutdown = state.shutdown().clone();
    tokio::spawn(async move {
        tokio::time::sleep(TEARDOWN_DELAY).await;
        shutdown.cancel();

        let watchdog = tokio::spawn(async {
            tokio::time::sleep(WATCHDOG_DELAY).await;
            std::process::exit(0);
        });

        run_teardown().await;
        watchdog.abort();
        std::process::exit(0);
    });
    "ok"
}

/// The embedded SSH server, if one was ever started, lives in this same
/// process and dies with it -- there's nothing extra to tear down for it.
async fn run_teardown() {
    match halt_mode() {
        HaltMode::Halt => {
            let _ = platform_halt_command().await;
        }
        HaltMode::Reboot => {
            let _ = platform_reboot_command().await;
        }
        HaltMode::Exit => {}
    }
}

#[cfg(target_os = "linux")]
async fn platform_halt_command() -> std::io::Result<std::process::ExitStatus> {
    Command::new("halt").status().await
}

#[cfg(target_os = "linux")]
async fn platform_reboot_command() -> std::io::Result<std::process::ExitStatus> {
    Command::new("reboot").status().await
}

#[cfg(not(target_os = "linux"))]
async fn platform_halt_command() -> std::io::Result<std::process::ExitStatus> {
    Command::new("shutdown").arg("-h").arg("now").status().await
}

#[cfg(not(target_os = "linux"))]
async fn platform_reboot_command() -> std::io::Result<std::process::ExitStatus> {
    Command::new("shutdown").arg("-r").arg("now").status().await
}

#[cfg(test)]
#[path = "halt_tests.rs"]
mod halt_tests;
