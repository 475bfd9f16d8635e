//! Password gate specs
//!
//! Verify gated endpoints require HTTP Basic auth with the configured
//! password while `/` and `/healthz` stay open, and that an unset
//! password disables the gate entirely.

use crate::prelude::Daemon;

#[tokio::test]
async fn gated_endpoint_rejects_a_missing_credential() {
    let daemon = Daemon::start_with(|c| c.password = Some("hunter2".to_string())).await;
    let response = Daemon::client()
        .get(daemon.url("/status"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn gated_endpoint_rejects_the_wrong_password() {
    let daemon = Daemon::start_with(|c| c.password = Some("hunter2".to_string())).await;
    let response = Daemon::client()
        .get(daemon.url("/status"))
        .basic_auth("ignored", Some("wrong"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn gated_endpoint_accepts_the_right_password_with_any_username() {
    let daemon = Daemon::start_with(|c| c.password = Some("hunter2".to_string())).await;
    let response = Daemon::client()
        .get(daemon.url("/status"))
        .basic_auth("whoever", Some("hunter2"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn no_password_configured_leaves_every_endpoint_open() {
    let daemon = Daemon::start().await;
    let response = Daemon::client()
        .get(daemon.url("/status"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}
