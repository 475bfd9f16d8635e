// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the process-wide [`buildlet_core::Config`] by overlaying the
//! parsed [`crate::flags::Flags`] (which already folded in environment
//! variables via `clap`'s `env` attribute) over an optional config-file
//! source, then static defaults.

use std::path::PathBuf;

use thiserror::Error;

use buildlet_core::{Config, ConfigError, ConfigSource, FileConfigSource};

use crate::flags::Flags;

const DEFAULT_HOST_TYPE: &str = "linux-amd64";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read {kind} file {path}: {source}")]
    ReadMaterial {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reverse mode requires --coordinator")]
    MissingCoordinator,
    #[error("--tls-cert and --tls-key must be set together")]
    IncompleteTlsMaterial,
}

/// Resolves `flags` into a [`Config`], consulting `--config-file` (if
/// given) for any field flags/env left unset.
pub fn resolve(flags: Flags) -> Result<Config, ResolveError> {
    let file_source = flags
        .config_file
        .as_deref()
        .map(FileConfigSource::load)
        .transpose()?;

    let from_file = |key: &str| -> Result<Option<String>, ConfigError> {
        match &file_source {
            Some(source) => source.get(key),
            None => Ok(None),
        }
    };

    let password = flags.password.or(from_file("password")?);
    let host_type = flags
        .host_type
        .or(from_file("host-type")?)
        .unwrap_or_else(|| DEFAULT_HOST_TYPE.to_string());

    let tls_cert_path = flags.tls_cert.or(from_file("tls-cert")?.map(PathBuf::from));
    let tls_key_path = flags.tls_key.or(from_file("tls-key")?.map(PathBuf::from));

    if tls_cert_path.is_some() != tls_key_path.is_some() {
        return Err(ResolveError::IncompleteTlsMaterial);
    }

    let tls_cert = tls_cert_path
        .map(|path| read_material("tls-cert", &path))
        .transpose()?;
    let tls_key = tls_key_path
        .map(|path| read_material("tls-key", &path))
        .transpose()?;

    if flags.reverse && flags.coordinator.is_none() && from_file("coordinator")?.is_none() {
        return Err(ResolveError::MissingCoordinator);
    }
    let coordinator_addr = flags.coordinator.or(from_file("coordinator")?);

    let workdir = flags
        .workdir
        .or_else(|| from_file("workdir").ok().flatten().map(PathBuf::from))
        .unwrap_or_else(default_workdir);

    Ok(Config {
        tls_cert,
        tls_key,
        password,
        host_type,
        coordinator_addr,
        reverse: flags.reverse,
        workdir,
    })
}

fn read_material(kind: &'static str, path: &std::path::Path) -> Result<Vec<u8>, ResolveError> {
    std::fs::read(path).map_err(|source| ResolveError::ReadMaterial {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

fn default_workdir() -> PathBuf {
    std::env::temp_dir().join("buildlet")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
