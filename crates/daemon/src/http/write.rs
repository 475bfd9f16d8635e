// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::{Query, State};
use bytes::Bytes;
use serde::Deserialize;

use buildlet_core::validate_relative_path;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WriteQuery {
    pub path: String,
    /// Octal file mode, e.g. `"0755"`. Ignored on non-Unix targets.
    pub mode: Option<String>,
}

pub async fn write_file(
    State(state): State<AppState>,
    Query(query): Query<WriteQuery>,
    body: Bytes,
) -> Result<&'static str, AppError> {
    let rel = validate_relative_path(state.platform(), &query.path)?;
    let target = state.workdir().root().join(rel);

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, &body).await?;

    if let Some(mode_str) = query.mode {
        apply_mode(&target, &mode_str).await?;
    }

    Ok("OK")
}

#[cfg(unix)]
async fn apply_mode(target: &std::path::Path, mode_str: &str) -> Result<(), AppError> {
    use std::os::unix::fs::PermissionsExt;
    let Ok(mode) = u32::from_str_radix(mode_str, 8) else {
        return Err(AppError::BadRequest(format!("invalid mode {mode_str:?}")));
    };
    tokio::fs::set_permissions(target, std::fs::Permissions::from_mode(mode)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn apply_mode(_target: &std::path::Path, _mode_str: &str) -> Result<(), AppError> {
    Ok(())
}

#[cfg(test)]
#[path = "write_tests.rs"]
mod write_tests;
