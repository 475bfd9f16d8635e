// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::State;
use axum::Json;

use buildlet_wire::StatusResponse;

use crate::env::PROTOCOL_VERSION;
use crate::state::AppState;

pub async fn root(State(state): State<AppState>) -> String {
    format!(
        "buildlet ({}) running; uptime {:?}",
        state.config().host_type,
        state.uptime()
    )
}

pub async fn healthz() -> &'static str {
    "ok\n"
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        version: PROTOCOL_VERSION.to_string(),
    })
}

pub async fn workdir(State(state): State<AppState>) -> String {
    state.workdir().expose()
}

/// Task-stack dump. Unlike a goroutine dump, tokio has no portable public
/// API for enumerating live task backtraces; reports what we can.
pub async fn debug_goroutines(State(state): State<AppState>) -> String {
    format!(
        "buildletd single-process task runtime, uptime {:?}\n",
        state.uptime()
    )
}

#[cfg(test)]
#[path = "misc_tests.rs"]
mod misc_tests;
