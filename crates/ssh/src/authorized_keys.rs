// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthorizedKeyError {
    #[error("io error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_err(path: &Path, source: io::Error) -> AuthorizedKeyError {
    AuthorizedKeyError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Appends `public_key` to `home/.ssh/authorized_keys`, creating the
/// directory and file with sshd's required permissions if needed. A key
/// already present is left untouched rather than duplicated.
pub fn ensure_authorized_key(home: &Path, public_key: &str) -> Result<(), AuthorizedKeyError> {
    let ssh_dir = home.join(".ssh");
    fs::create_dir_all(&ssh_dir).map_err(|e| io_err(&ssh_dir, e))?;
    set_mode(&ssh_dir, 0o700)?;

    let keys_path = ssh_dir.join("authorized_keys");
    let existing = fs::read_to_string(&keys_path).unwrap_or_default();
    let trimmed = public_key.trim();

    if existing.lines().any(|line| line.trim() == trimmed) {
        return Ok(());
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&keys_path)
        .map_err(|e| io_err(&keys_path, e))?;
    writeln!(file, "{trimmed}").map_err(|e| io_err(&keys_path, e))?;
    drop(file);

    set_mode(&keys_path, 0o600)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), AuthorizedKeyError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), AuthorizedKeyError> {
    Ok(())
}

#[cfg(test)]
#[path = "authorized_keys_tests.rs"]
mod authorized_keys_tests;
