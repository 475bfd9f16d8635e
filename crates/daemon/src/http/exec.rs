// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /exec`: streams a child process's combined stdout/stderr as the
//! response body and reports its terminal state in a `Process-State`
//! trailer. A client disconnect mid-stream kills the process tree instead
//! of letting it run to completion unobserved.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::State;
use axum::response::Response;
use bytes::Bytes;
use futures_util::Stream;
use http::HeaderValue;
use http_body::Frame;
use tokio::io::duplex;
use tokio::sync::oneshot;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

use buildlet_exec::{
    assemble_env, check_emulator_liveness, lockdown_outbound_network, resolve_command,
    resolve_dir, run, RunRequest,
};
use buildlet_wire::{ExecParams, ProcessState, PROCESS_STATE_TRAILER};

use crate::error::AppError;
use crate::state::AppState;

const DUPLEX_BUF: usize = 64 * 1024;

pub async fn run_exec(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let params = ExecParams::from_pairs(form_urlencoded::parse(body.as_ref()).into_owned())?;

    if let Some(serial) = android_serial(&state) {
        check_emulator_liveness("adb", &serial).await?;
    }

    let workdir = state.workdir();
    let root = workdir.root();
    let cache_paths = workdir.ensure_caches()?;

    let command = resolve_command(&params.cmd, params.sys_mode, root)?;
    let dir = resolve_dir(params.dir.as_deref(), root, state.platform())?;

    if env_is_truthy(&params.env, "GO_DISABLE_OUTBOUND_NETWORK") {
        lockdown_outbound_network().await?;
    }

    let base_env: Vec<String> = std::env::vars().map(|(k, v)| format!("{k}={v}")).collect();
    let env = assemble_env(
        state.platform(),
        &base_env,
        &cache_paths,
        &params.env,
        &params.path,
        root,
    );

    let req = RunRequest {
        command,
        args: params.cmd_args,
        dir,
        env,
        debug: params.debug,
    };

    let (writer, reader) = duplex(DUPLEX_BUF);
    let cancel = CancellationToken::new();
    let (state_tx, state_rx) = oneshot::channel();

    let run_cancel = cancel.clone();
    tokio::spawn(async move {
        let outcome = run(req, writer, run_cancel).await;
        let process_state = match outcome {
            Ok(outcome) => outcome.state,
            Err(e) => ProcessState::Error(e.to_string()),
        };
        let _ = state_tx.send(process_state);
    });

    let exec_body = ExecBody {
        reader: ReaderStream::new(reader),
        state_rx,
        cancel: Some(cancel),
        stage: Stage::Streaming,
    };

    let mut response = Response::new(Body::new(exec_body));
    response.headers_mut().insert(
        http::header::TRAILER,
        HeaderValue::from_static(PROCESS_STATE_TRAILER),
    );
    Ok(response)
}

fn env_is_truthy(env: &[String], key: &str) -> bool {
    env.iter()
        .filter_map(|kv| kv.split_once('='))
        .filter(|(k, _)| *k == key)
        .last()
        .map(|(_, v)| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Android builders gate every `/exec` on emulator liveness; every other
/// host type skips the check entirely.
fn android_serial(state: &AppState) -> Option<String> {
    if state.config().host_type.contains("android") {
        std::env::var("ANDROID_SERIAL").ok()
    } else {
        None
    }
}

enum Stage {
    Streaming,
    Trailer,
    Done,
}

struct ExecBody {
    reader: ReaderStream<tokio::io::DuplexStream>,
    state_rx: oneshot::Receiver<ProcessState>,
    /// Armed until the stream reaches natural EOF; dropping the body
    /// beforehand (the client disconnected) fires the cancellation that
    /// kills the child's process tree.
    cancel: Option<CancellationToken>,
    stage: Stage,
}

impl http_body::Body for ExecBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        loop {
            match this.stage {
                Stage::Streaming => match Pin::new(&mut this.reader).poll_next(cx) {
                    Poll::Ready(Some(Ok(bytes))) => {
                        return Poll::Ready(Some(Ok(Frame::data(bytes))))
                    }
                    Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                    Poll::Ready(None) => {
                        this.cancel.take();
                        this.stage = Stage::Trailer;
                    }
                    Poll::Pending => return Poll::Pending,
                },
                Stage::Trailer => match Pin::new(&mut this.state_rx).poll(cx) {
                    Poll::Ready(Ok(process_state)) => {
                        this.stage = Stage::Done;
                        return Poll::Ready(Some(Ok(Frame::trailers(trailer_map(
                            &process_state,
                        )))));
                    }
                    Poll::Ready(Err(_)) => {
                        this.stage = Stage::Done;
                        return Poll::Ready(None);
                    }
                    Poll::Pending => return Poll::Pending,
                },
                Stage::Done => return Poll::Ready(None),
            }
        }
    }
}

impl Drop for ExecBody {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

fn trailer_map(state: &ProcessState) -> http::HeaderMap {
    let value = match state {
        ProcessState::Exited(0) => "ok".to_string(),
        other => other.to_string(),
    };
    let mut map = http::HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&value) {
        map.insert(http::header::HeaderName::from_static("process-state"), value);
    }
    map
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod exec_tests;
