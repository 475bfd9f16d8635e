// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::Parser;

/// buildletd: the remote build-execution agent's HTTP daemon.
///
/// Precedence for every setting below is flag > environment variable >
/// config-source file (`--config-file`) > built-in default; the env
/// fallback is handled here by `clap`, the config-source fallback by
/// [`crate::config::resolve`].
#[derive(Debug, Parser)]
#[command(name = "buildletd")]
pub struct Flags {
    /// Address to listen on, e.g. `0.0.0.0:8080`. Ignored in reverse mode.
    #[arg(long, env = "BUILDLET_LISTEN")]
    pub listen: Option<String>,

    /// Run in reverse mode: dial the coordinator instead of listening.
    #[arg(long, env = "BUILDLET_REVERSE")]
    pub reverse: bool,

    /// Coordinator address to dial in reverse mode.
    #[arg(long, env = "BUILDLET_COORDINATOR")]
    pub coordinator: Option<String>,

    /// HTTP CONNECT proxy to tunnel the reverse dial through.
    #[arg(long, env = "BUILDLET_PROXY")]
    pub proxy: Option<String>,

    /// Path to a TLS certificate (PEM). Enables TLS in listen mode.
    #[arg(long, env = "BUILDLET_TLS_CERT")]
    pub tls_cert: Option<PathBuf>,

    /// Path to the TLS private key (PEM) matching `--tls-cert`.
    #[arg(long, env = "BUILDLET_TLS_KEY")]
    pub tls_key: Option<PathBuf>,

    /// Require this password via HTTP Basic auth on every request.
    #[arg(long, env = "BUILDLET_PASSWORD")]
    pub password: Option<String>,

    /// Reported host type, e.g. `linux-amd64`.
    #[arg(long, env = "BUILDLET_HOST_TYPE")]
    pub host_type: Option<String>,

    /// Workdir root. Defaults to a platform temp directory if unset.
    #[arg(long, env = "BUILDLET_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// A TOML file providing defaults for any setting not given as a
    /// flag or environment variable.
    #[arg(long, env = "BUILDLET_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,
}

#[cfg(test)]
#[path = "flags_tests.rs"]
mod flags_tests;
