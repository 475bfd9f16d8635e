// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use std::path::Path;
use std::process::Stdio;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::process::{Child, Command};

/// Candidate ports tried in order: sshd's default, then two commonly-open
/// fallbacks on hosts where 22 is already taken by the platform's own
/// sshd.
const CANDIDATE_PORTS: [u16; 3] = [22, 2200, 2222];

#[derive(Debug, Error)]
pub enum SshdError {
    #[error("no candidate port in {CANDIDATE_PORTS:?} is free")]
    NoPortAvailable,
    #[error("failed to spawn sshd: {0}")]
    Spawn(#[source] io::Error),
    #[error("no supported way to start sshd on this host")]
    NoStrategyAvailable,
}

/// How the daemon starts sshd for a `/connect-ssh` session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SshdStrategy {
    /// Spawn `/usr/sbin/sshd -D` directly and supervise it as a child.
    ForegroundSubprocess,
    /// Ask the host's service manager (systemd or launchd) to start it.
    ServiceManager,
    /// Run an in-process SSH server with no external sshd binary at all.
    Embedded,
}

/// Finds the first candidate port nothing is already listening on, by
/// binding and immediately releasing it. There is an unavoidable race
/// between the probe and the real bind, same as any "find a free port"
/// helper.
pub async fn select_port() -> Result<u16, SshdError> {
    for port in CANDIDATE_PORTS {
        if TcpListener::bind(("127.0.0.1", port)).await.is_ok() {
            return Ok(port);
        }
    }
    Err(SshdError::NoPortAvailable)
}

/// Spawns `/usr/sbin/sshd` in the foreground, bound to `port`, reading
/// authorized keys from `authorized_keys_path`. The caller owns the
/// returned child and is responsible for reaping it.
pub async fn spawn_foreground(
    sshd_path: &Path,
    port: u16,
    authorized_keys_path: &Path,
) -> Result<Child, SshdError> {
    Command::new(sshd_path)
        .arg("-D")
        .arg("-p")
        .arg(port.to_string())
        .arg("-o")
        .arg(format!(
            "AuthorizedKeysFile={}",
            authorized_keys_path.display()
        ))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(SshdError::Spawn)
}

/// Asks the host's service manager to (re)start sshd, trying systemd then
/// launchd; returns an error if neither is present.
pub async fn start_via_service_manager() -> Result<(), SshdError> {
    if which_exists("systemctl").await {
        run_status_checked("systemctl", &["restart", "ssh"]).await
    } else if which_exists("launchctl").await {
        run_status_checked(
            "launchctl",
            &["kickstart", "-k", "system/com.openssh.sshd"],
        )
        .await
    } else {
        Err(SshdError::NoStrategyAvailable)
    }
}

async fn which_exists(bin: &str) -> bool {
    Command::new("which")
        .arg(bin)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

async fn run_status_checked(bin: &str, args: &[&str]) -> Result<(), SshdError> {
    let status = Command::new(bin)
        .args(args)
        .status()
        .await
        .map_err(SshdError::Spawn)?;
    if status.success() {
        Ok(())
    } else {
        Err(SshdError::NoStrategyAvailable)
    }
}

#[cfg(test)]
#[path = "sshd_tests.rs"]
mod sshd_tests;
