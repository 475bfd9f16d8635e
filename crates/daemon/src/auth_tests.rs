// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use axum::body::Body;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use buildlet_core::{Config, Platform};

fn app(password: Option<&str>) -> Router {
    let config = Config {
        tls_cert: None,
        tls_key: None,
        password: password.map(str::to_string),
        host_type: "linux-amd64".to_string(),
        coordinator_addr: None,
        reverse: false,
        workdir: std::env::temp_dir(),
    };
    let state = AppState::new(config, Platform::host(), CancellationToken::new());
    Router::new()
        .route("/protected", get(|| async { "ok" }))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_password))
        .with_state(state)
}

#[tokio::test]
async fn no_password_configured_allows_through() {
    let response = app(None)
        .oneshot(axum::http::Request::get("/protected").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_credentials_are_forbidden() {
    let response = app(Some("secret"))
        .oneshot(axum::http::Request::get("/protected").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_password_is_forbidden() {
    use base64::Engine;
    let creds = base64::engine::general_purpose::STANDARD.encode("ignored:wrong");
    let response = app(Some("secret"))
        .oneshot(
            axum::http::Request::get("/protected")
                .header("authorization", format!("Basic {creds}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn correct_password_is_allowed() {
    use base64::Engine;
    let creds = base64::engine::general_purpose::STANDARD.encode("ignored:secret");
    let response = app(Some("secret"))
        .oneshot(
            axum::http::Request::get("/protected")
                .header("authorization", format!("Basic {creds}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
