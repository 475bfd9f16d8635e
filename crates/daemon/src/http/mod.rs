// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The endpoint table from §6: mounted on a default router, all
//! non-trivial endpoints wrapped by the password gate.

mod connect_ssh;
mod exec;
mod halt;
mod ls;
mod misc;
mod removeall;
mod tgz;
mod write;
mod writetgz;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;

use crate::auth::require_password;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/status", get(misc::status))
        .route("/workdir", get(misc::workdir))
        .route("/debug/goroutines", get(misc::debug_goroutines))
        .route("/write", put(write::write_file))
        .route("/writetgz", put(writetgz::extract_body).post(writetgz::fetch_and_extract))
        .route("/tgz", get(tgz::stream_tgz))
        .route("/removeall", post(removeall::remove_all))
        .route("/ls", get(ls::list_dir))
        .route("/exec", post(exec::run_exec))
        .route("/connect-ssh", post(connect_ssh::connect_ssh))
        .route("/halt", post(halt::halt))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_password));

    Router::new()
        .route("/", get(misc::root))
        .route("/healthz", get(misc::healthz))
        .merge(gated)
        .with_state(state)
}
