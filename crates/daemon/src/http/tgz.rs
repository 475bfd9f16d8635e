// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::Response;
use serde::Deserialize;
use tokio::sync::mpsc;

use buildlet_archive::write_tar_gz;
use buildlet_core::validate_relative_path;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TgzQuery {
    #[serde(default)]
    pub dir: String,
}

/// Forwards `write_tar_gz`'s synchronous `Write` calls onto a bounded
/// channel so the blocking-thread encoder and the async response body
/// can run concurrently.
struct ChannelWriter(mpsc::Sender<Vec<u8>>);

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .blocking_send(buf.to_vec())
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::BrokenPipe, "client disconnected"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub async fn stream_tgz(
    State(state): State<AppState>,
    Query(query): Query<TgzQuery>,
) -> Result<Response, AppError> {
    let src = if query.dir.is_empty() {
        state.workdir().root().to_path_buf()
    } else {
        let rel = validate_relative_path(state.platform(), &query.dir)?;
        state.workdir().root().join(rel)
    };

    let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
    tokio::task::spawn_blocking(move || {
        let writer = ChannelWriter(tx);
        if let Err(err) = write_tar_gz(&src, writer) {
            tracing::warn!(error = %err, "tgz egress failed mid-stream");
        }
    });

    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (Ok::<_, std::io::Error>(chunk), rx))
    });

    let mut response = Response::new(Body::from_stream(stream));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
    Ok(response)
}

#[cfg(test)]
#[path = "tgz_tests.rs"]
mod tgz_tests;
