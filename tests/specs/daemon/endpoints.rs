//! Endpoint table specs
//!
//! Verify the plain-HTTP surface other than `/exec`: status, workdir
//! introspection, file write/list round-trips, and archive bootstrap
//! skip behavior.

use crate::prelude::Daemon;

#[tokio::test]
async fn root_reports_host_type_and_uptime() {
    let daemon = Daemon::start().await;
    let body = Daemon::client()
        .get(daemon.url("/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("linux-amd64"));
}

#[tokio::test]
async fn healthz_is_always_reachable_without_a_password() {
    let daemon = Daemon::start_with(|c| c.password = Some("secret".to_string())).await;
    let response = Daemon::client()
        .get(daemon.url("/healthz"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok\n");
}

#[tokio::test]
async fn status_reports_the_protocol_version() {
    let daemon = Daemon::start().await;
    let body: serde_json::Value = Daemon::client()
        .get(daemon.url("/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn workdir_reports_the_configured_scratch_directory() {
    let daemon = Daemon::start().await;
    let body = Daemon::client()
        .get(daemon.url("/workdir"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, daemon.workdir.path().display().to_string());
}

#[tokio::test]
async fn write_then_ls_round_trips_a_file() {
    let daemon = Daemon::start().await;
    let client = Daemon::client();

    let write = client
        .put(daemon.url("/write?path=hello.txt"))
        .body("hello buildlet")
        .send()
        .await
        .unwrap();
    assert_eq!(write.status(), 200);

    let listing = client
        .get(daemon.url("/ls"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let line = listing.lines().find(|l| l.starts_with("hello.txt\t")).unwrap();
    let fields: Vec<&str> = line.split('\t').collect();
    assert_eq!(fields[1], "14");
}

#[tokio::test]
async fn write_rejects_a_path_that_escapes_the_workdir() {
    let daemon = Daemon::start().await;
    let response = Daemon::client()
        .put(daemon.url("/write?path=../escape.txt"))
        .body("nope")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn writetgz_skips_an_already_bootstrapped_go_dir() {
    let daemon = Daemon::start().await;
    std::fs::create_dir_all(daemon.workdir.path().join("go")).unwrap();

    let response = Daemon::client()
        .put(daemon.url("/writetgz?dir=go"))
        .body(Vec::<u8>::new())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "SKIP");
}

#[tokio::test]
async fn removeall_deletes_the_named_path() {
    let daemon = Daemon::start().await;
    let client = Daemon::client();
    client
        .put(daemon.url("/write?path=doomed.txt"))
        .body("bye")
        .send()
        .await
        .unwrap();

    let remove = client
        .post(daemon.url("/removeall"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("path=doomed.txt")
        .send()
        .await
        .unwrap();
    assert_eq!(remove.status(), 200);
    assert!(!daemon.workdir.path().join("doomed.txt").exists());
}
