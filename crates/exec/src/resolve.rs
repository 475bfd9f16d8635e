// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use thiserror::Error;

use buildlet_core::{validate_relative_path, PathError, Platform};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("bad working directory: {0}")]
    BadDir(#[from] PathError),
    #[error("command `{0}` not found under the workdir (sys mode was not requested)")]
    NotFoundInSandbox(String),
}

/// Resolves the command to run. In sys mode the command is handed to the
/// OS verbatim and resolved against `$PATH` at spawn time, same as any
/// shell would. Outside sys mode it must exist under the workdir already
/// (the client uploaded it via `/writetgz`); bare `PATH` lookup is refused
/// so a client can't accidentally run a tool that happens to be installed
/// on the host rather than the one it just shipped.
pub fn resolve_command(cmd: &str, sys_mode: bool, workdir: &Path) -> Result<PathBuf, ResolveError> {
    if sys_mode {
        return Ok(PathBuf::from(cmd));
    }

    let candidate = workdir.join(cmd);
    if candidate.is_file() {
        return Ok(candidate);
    }
    Err(ResolveError::NotFoundInSandbox(cmd.to_string()))
}

/// Resolves the `dir` form field to an absolute path under the workdir.
/// An absent or empty value resolves to the workdir root itself.
pub fn resolve_dir(
    dir: Option<&str>,
    workdir: &Path,
    platform: Platform,
) -> Result<PathBuf, ResolveError> {
    match dir {
        None => Ok(workdir.to_path_buf()),
        Some(d) if d.is_empty() => Ok(workdir.to_path_buf()),
        Some(d) => {
            let safe = validate_relative_path(platform, d)?;
            Ok(workdir.join(safe))
        }
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod resolve_tests;
