// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::body::to_bytes;
use axum::extract::{Query, Request, State};
use bytes::Bytes;
use serde::Deserialize;

use buildlet_archive::extract_tar_gz;
use buildlet_core::validate_relative_path;

use crate::error::AppError;
use crate::state::AppState;

/// The well-known bootstrap-toolchain subdirectory; an extraction
/// targeting it is skipped entirely when it already exists, sparing the
/// client an expensive re-upload.
const BOOTSTRAP_DIR: &str = "go";

#[derive(Debug, Deserialize)]
pub struct WritetgzQuery {
    #[serde(default)]
    pub dir: String,
}


fn target_dir(state: &AppState, dir: &str) -> Result<std::path::PathBuf, AppError> {
    if dir.is_empty() {
        return Ok(state.workdir().root().to_path_buf());
    }
    let rel = validate_relative_path(state.platform(), dir)?;
    Ok(state.workdir().root().join(rel))
}

fn already_bootstrapped(query: &WritetgzQuery, target: &std::path::Path) -> bool {
    query.dir == BOOTSTRAP_DIR && target.is_dir()
}

/// `PUT /writetgz?dir=...`: body is the archive itself.
///
/// Takes the raw [`Request`] rather than an auto-buffering `Bytes`
/// extractor so the already-bootstrapped check below can run before a
/// single byte of the body is read off the socket.
pub async fn extract_body(
    State(state): State<AppState>,
    Query(query): Query<WritetgzQuery>,
    request: Request,
) -> Result<&'static str, AppError> {
    state.workdir().ensure()?;
    let target = target_dir(&state, &query.dir)?;
    if already_bootstrapped(&query, &target) {
        return Ok("SKIP");
    }

    let body = to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| AppError::BadRequest(format!("reading request body: {e}")))?;

    std::fs::create_dir_all(&target)?;
    extract_tar_gz(body.as_ref(), &target, state.platform())?;
    Ok("OK")
}

/// `POST /writetgz?dir=...`: form field `url` names a remote archive to
/// fetch and extract.
pub async fn fetch_and_extract(
    State(state): State<AppState>,
    Query(query): Query<WritetgzQuery>,
    body: Bytes,
) -> Result<&'static str, AppError> {
    state.workdir().ensure()?;
    let target = target_dir(&state, &query.dir)?;
    if already_bootstrapped(&query, &target) {
        return Ok("SKIP");
    }

    let url = form_urlencoded::parse(body.as_ref())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| AppError::BadRequest("missing form field `url`".to_string()))?;

    let response = reqwest::get(&url)
        .await
        .map_err(|e| AppError::ServerFailure(format!("fetch of {url} failed: {e}")))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::ServerFailure(format!("reading {url} failed: {e}")))?;

    std::fs::create_dir_all(&target)?;
    extract_tar_gz(bytes.as_ref(), &target, state.platform())?;
    Ok("OK")
}

#[cfg(test)]
#[path = "writetgz_tests.rs"]
mod writetgz_tests;
