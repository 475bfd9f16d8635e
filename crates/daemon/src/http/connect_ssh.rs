// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /connect-ssh`: a one-shot HTTP-Upgrade endpoint. Optionally
//! provisions an authorized key, starts the local sshd the first time
//! it's called, then hijacks the connection and bridges it full-duplex
//! to the sshd port.

use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::Response;
use http::{HeaderValue, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::sync::OnceCell;

use buildlet_ssh::{
    bridge_streams, ensure_authorized_key, select_port, spawn_embedded_server, spawn_foreground,
    start_via_service_manager, SshdStrategy,
};

use crate::error::AppError;
use crate::state::AppState;

const SSH_USER_HEADER: &str = "X-Go-Ssh-User";
const AUTHORIZED_KEY_HEADER: &str = "X-Go-Authorized-Key";
const SSHD_BINARY: &str = "/usr/sbin/sshd";

static SSHD_PORT: OnceCell<u16> = OnceCell::const_new();

pub async fn connect_ssh(
    State(state): State<AppState>,
    mut request: Request,
) -> Result<Response, AppError> {
    let user = header_value(&request, SSH_USER_HEADER).unwrap_or_else(|| "root".to_string());
    let authorized_key = header_value(&request, AUTHORIZED_KEY_HEADER);
    let home = home_dir_for(&user);

    if let Some(key) = &authorized_key {
        ensure_authorized_key(&home, key)?;
    }

    let strategy = choose_strategy(&state.config().host_type);
    let authorized_keys_path = home.join(".ssh").join("authorized_keys");
    let port = ensure_sshd_started(strategy, authorized_key.unwrap_or_default(), authorized_keys_path).await?;

    let on_upgrade = hyper::upgrade::on(&mut request);
    tokio::spawn(async move {
        match on_upgrade.await {
            Ok(upgraded) => {
                let io = TokioIo::new(upgraded);
                if let Err(e) = bridge_streams(io, port).await {
                    tracing::warn!(error = %e, "ssh bridge ended with an error");
                }
            }
            Err(e) => tracing::warn!(error = %e, "connect-ssh upgrade failed"),
        }
    });

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::SWITCHING_PROTOCOLS;
    response
        .headers_mut()
        .insert(http::header::UPGRADE, HeaderValue::from_static("ssh"));
    response
        .headers_mut()
        .insert(http::header::CONNECTION, HeaderValue::from_static("Upgrade"));
    Ok(response)
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Picks the provisioning strategy by host type; see `SshdStrategy` for
/// what each does.
fn choose_strategy(host_type: &str) -> SshdStrategy {
    if host_type.contains("android") || host_type.contains("ios") {
        SshdStrategy::Embedded
    } else if host_type.contains("openbsd") || host_type.contains("freebsd") || host_type.contains("netbsd")
    {
        SshdStrategy::ServiceManager
    } else {
        SshdStrategy::ForegroundSubprocess
    }
}

/// A real user lookup would consult the passwd database; the buildlet
/// fleet only ever nominates the current login or a fixed conventional
/// user, so this sticks to `$HOME`/`/home/<user>`.
fn home_dir_for(user: &str) -> PathBuf {
    if let Ok(current) = std::env::var("USER") {
        if current == user {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home);
            }
        }
    }
    PathBuf::from(format!("/home/{user}"))
}

async fn ensure_sshd_started(
    strategy: SshdStrategy,
    authorized_key: String,
    authorized_keys_path: PathBuf,
) -> Result<u16, AppError> {
    let port = SSHD_PORT
        .get_or_try_init(|| async {
            let port = select_port().await?;
            match strategy {
                SshdStrategy::ForegroundSubprocess => {
                    spawn_foreground_supervisor(port, authorized_keys_path);
                }
                SshdStrategy::ServiceManager => {
                    start_via_service_manager().await?;
                }
                SshdStrategy::Embedded => {
                    spawn_embedded_server(port, authorized_key).await?;
                }
            }
            Ok::<u16, AppError>(port)
        })
        .await?;
    Ok(*port)
}

/// Runs `sshd -D` under a restart loop, same as a process supervisor
/// would, with a one-second floor between attempts so a misconfigured
/// sshd can't spin the host.
fn spawn_foreground_supervisor(port: u16, authorized_keys_path: PathBuf) {
    tokio::spawn(async move {
        ensure_host_keys().await;
        loop {
            match spawn_foreground(std::path::Path::new(SSHD_BINARY), port, &authorized_keys_path).await {
                Ok(mut child) => {
                    let _ = child.wait().await;
                }
                Err(e) => tracing::warn!(error = %e, "failed to spawn sshd"),
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    });
}

async fn ensure_host_keys() {
    let _ = tokio::fs::create_dir_all("/run/sshd").await;
    let _ = tokio::process::Command::new("ssh-keygen")
        .arg("-A")
        .status()
        .await;
}

#[cfg(test)]
#[path = "connect_ssh_tests.rs"]
mod connect_ssh_tests;
