// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

use axum::extract::{Query, State};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use buildlet_core::validate_relative_path;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LsQuery {
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub digest: bool,
    /// Comma-separated path components to skip, directories included.
    #[serde(default)]
    pub skip: String,
}

/// `GET /ls`: one TSV line per entry --
/// `name\tsize\tmode\tmtime_unix\tsha256-or-empty`.
pub async fn list_dir(
    State(state): State<AppState>,
    Query(query): Query<LsQuery>,
) -> Result<String, AppError> {
    let root = if query.dir.is_empty() {
        state.workdir().root().to_path_buf()
    } else {
        let rel = validate_relative_path(state.platform(), &query.dir)?;
        state.workdir().root().join(rel)
    };

    let skip: Vec<&str> = query.skip.split(',').filter(|s| !s.is_empty()).collect();
    let mut out = String::new();

    let mut walker = walkdir::WalkDir::new(&root).min_depth(1);
    if !query.recursive {
        walker = walker.max_depth(1);
    }

    for entry in walker.into_iter().filter_entry(|e| !should_skip(e, &skip)) {
        let entry = entry.map_err(|e| AppError::ServerFailure(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(&root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");
        let meta = entry.metadata().map_err(|e| AppError::ServerFailure(e.to_string()))?;
        let mode = file_mode(&meta);
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let digest = if query.digest && meta.is_file() {
            sha256_hex(entry.path())?
        } else {
            String::new()
        };

        let _ = writeln!(
            out,
            "{relative}\t{}\t{mode:o}\t{mtime}\t{digest}",
            meta.len()
        );
    }

    Ok(out)
}

fn should_skip(entry: &walkdir::DirEntry, skip: &[&str]) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| skip.contains(&name))
        .unwrap_or(false)
}

#[cfg(unix)]
fn file_mode(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(meta: &std::fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

fn sha256_hex(path: &Path) -> Result<String, AppError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let digest = hasher.finalize();
    Ok(digest.iter().fold(String::with_capacity(64), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    }))
}

#[cfg(test)]
#[path = "ls_tests.rs"]
mod ls_tests;
