// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque key→value configuration sources.
//!
//! The daemon resolves TLS material and the optional shared password
//! through this trait so that cloud-metadata-backed implementations (GCE
//! guest attributes, EC2 instance tags — out of scope here, see spec §1)
//! compose transparently with the env/file backends used in development
//! and in static VM images.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Keys that must never be echoed back in logs or `Debug` output.
pub const SENSITIVE_KEYS: &[&str] = &["password", "tls-key"];

/// An opaque key→value configuration backend.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError>;
}

/// Reads `BUILDLET_<KEY>` environment variables (key upper-cased, `-` → `_`).
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvConfigSource;

impl EnvConfigSource {
    fn env_name(key: &str) -> String {
        format!("BUILDLET_{}", key.to_ascii_uppercase().replace('-', "_"))
    }
}

impl ConfigSource for EnvConfigSource {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(std::env::var(Self::env_name(key)).ok())
    }
}

/// Reads a TOML file mapping the same opaque keys to strings.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    values: HashMap<String, String>,
}

impl FileConfigSource {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let values: HashMap<String, String> =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(FileConfigSource { values })
    }
}

impl ConfigSource for FileConfigSource {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }
}

/// A static in-memory source, handy for tests and for composing a
/// cloud-metadata implementation without exposing its internals here.
#[derive(Debug, Default, Clone)]
pub struct StaticConfigSource {
    values: HashMap<String, String>,
}

impl StaticConfigSource {
    pub fn new(values: HashMap<String, String>) -> Self {
        StaticConfigSource { values }
    }
}

impl ConfigSource for StaticConfigSource {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Redact sensitive keys for logging.
pub fn redact_for_log(key: &str, value: &str) -> String {
    if SENSITIVE_KEYS.contains(&key) {
        "<redacted>".to_string()
    } else {
        value.to_string()
    }
}

/// The resolved, process-wide, read-only configuration the daemon starts
/// with. Built by overlaying flag > env var > config source > default
/// (see [`crate`] docs and spec §4.10).
#[derive(Clone)]
pub struct Config {
    pub tls_cert: Option<Vec<u8>>,
    pub tls_key: Option<Vec<u8>>,
    pub password: Option<String>,
    pub host_type: String,
    pub coordinator_addr: Option<String>,
    pub reverse: bool,
    pub workdir: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("tls_cert", &self.tls_cert.as_ref().map(|_| "<redacted>"))
            .field("tls_key", &self.tls_key.as_ref().map(|_| "<redacted>"))
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("host_type", &self.host_type)
            .field("coordinator_addr", &self.coordinator_addr)
            .field("reverse", &self.reverse)
            .field("workdir", &self.workdir)
            .finish()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
