// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::State;
use bytes::Bytes;

use buildlet_core::validate_relative_path;

use crate::error::AppError;
use crate::state::AppState;

/// `POST /removeall`: form field `path`, repeated once per workdir-relative
/// path to delete. An empty/absent `path` clears the whole workdir.
pub async fn remove_all(State(state): State<AppState>, body: Bytes) -> Result<(), AppError> {
    let paths: Vec<String> = form_urlencoded::parse(body.as_ref())
        .filter(|(key, _)| key == "path")
        .map(|(_, value)| value.into_owned())
        .collect();

    for path in paths {
        let rel = validate_relative_path(state.platform(), &path)?;
        state.workdir().reset(&rel)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "removeall_tests.rs"]
mod removeall_tests;
