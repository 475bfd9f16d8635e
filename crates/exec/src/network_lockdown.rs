// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use std::process::Stdio;
use std::sync::Once;

use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum NetworkLockdownError {
    #[error("firewall command failed: {0}")]
    CommandFailed(#[source] io::Error),
    #[error("firewall command exited non-zero")]
    NonZeroExit,
}

static LOCKDOWN_GUARD: Once = Once::new();

/// Installs an outbound-network-deny firewall rule the first time it's
/// called in this process; later calls are no-ops. `/exec` requests that
/// ask to run network-isolated invoke this before spawning.
pub async fn lockdown_outbound_network() -> Result<(), NetworkLockdownError> {
    let mut result = Ok(());
    let mut ran = false;
    LOCKDOWN_GUARD.call_once(|| {
        ran = true;
    });
    if ran {
        result = run_lockdown_command().await;
    }
    result
}

#[cfg(target_os = "linux")]
async fn run_lockdown_command() -> Result<(), NetworkLockdownError> {
    apply(
        "iptables",
        &["-A", "OUTPUT", "-m", "owner", "--uid-owner", "buildlet", "-j", "REJECT"],
    )
    .await
}

#[cfg(target_os = "macos")]
async fn run_lockdown_command() -> Result<(), NetworkLockdownError> {
    apply("pfctl", &["-e"]).await
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
async fn run_lockdown_command() -> Result<(), NetworkLockdownError> {
    Ok(())
}

#[allow(dead_code)]
async fn apply(bin: &str, args: &[&str]) -> Result<(), NetworkLockdownError> {
    let status = Command::new(bin)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(NetworkLockdownError::CommandFailed)?;
    if status.success() {
        Ok(())
    } else {
        Err(NetworkLockdownError::NonZeroExit)
    }
}

#[cfg(test)]
#[path = "network_lockdown_tests.rs"]
mod network_lockdown_tests;
