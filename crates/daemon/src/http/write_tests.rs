// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use axum::extract::{Query, State};
use tokio_util::sync::CancellationToken;

use buildlet_core::{Config, Platform};

fn state(workdir: std::path::PathBuf) -> AppState {
    let config = Config {
        tls_cert: None,
        tls_key: None,
        password: None,
        host_type: "linux-amd64".to_string(),
        coordinator_addr: None,
        reverse: false,
        workdir,
    };
    AppState::new(config, Platform::host(), CancellationToken::new())
}

#[tokio::test]
async fn writes_bytes_to_nested_path() {
    let dir = tempfile::tempdir().unwrap();
    let s = state(dir.path().to_path_buf());
    let query = WriteQuery {
        path: "nested/file.txt".to_string(),
        mode: None,
    };
    let result = write_file(State(s), Query(query), Bytes::from_static(b"hello")).await;
    assert!(result.is_ok());
    let contents = std::fs::read_to_string(dir.path().join("nested/file.txt")).unwrap();
    assert_eq!(contents, "hello");
}

#[tokio::test]
async fn rejects_escaping_path() {
    let dir = tempfile::tempdir().unwrap();
    let s = state(dir.path().to_path_buf());
    let query = WriteQuery {
        path: "../escape.txt".to_string(),
        mode: None,
    };
    let result = write_file(State(s), Query(query), Bytes::from_static(b"x")).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[cfg(unix)]
#[tokio::test]
async fn applies_requested_mode() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let s = state(dir.path().to_path_buf());
    let query = WriteQuery {
        path: "script.sh".to_string(),
        mode: Some("0755".to_string()),
    };
    write_file(State(s), Query(query), Bytes::from_static(b"#!/bin/sh"))
        .await
        .unwrap();
    let meta = std::fs::metadata(dir.path().join("script.sh")).unwrap();
    assert_eq!(meta.permissions().mode() & 0o777, 0o755);
}
