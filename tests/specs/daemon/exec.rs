//! `/exec` specs
//!
//! Verify the `Process-State` trailer tracks the child's exit status and
//! that a client disconnect kills the whole process tree instead of
//! letting it run unobserved.

use std::time::Duration;

use crate::prelude::Daemon;

fn exec_form(pairs: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

#[tokio::test]
async fn a_clean_exit_reports_ok_in_the_trailer() {
    let daemon = Daemon::start().await;
    let body = exec_form(&[("cmd", "/bin/sh"), ("mode", "sys"), ("cmdArg", "-c"), ("cmdArg", "echo hi")]);

    let mut response = Daemon::client()
        .post(daemon.url("/exec"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let mut out = Vec::new();
    while let Some(chunk) = response.chunk().await.unwrap() {
        out.extend_from_slice(&chunk);
    }
    assert_eq!(String::from_utf8(out).unwrap(), "hi\n");

    let trailers = response.trailers().await.unwrap().unwrap();
    assert_eq!(trailers.get("process-state").unwrap(), "ok");
}

#[tokio::test]
async fn a_nonzero_exit_is_reported_verbatim_in_the_trailer() {
    let daemon = Daemon::start().await;
    let body = exec_form(&[("cmd", "/bin/sh"), ("mode", "sys"), ("cmdArg", "-c"), ("cmdArg", "exit 3")]);

    let mut response = Daemon::client()
        .post(daemon.url("/exec"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    while response.chunk().await.unwrap().is_some() {}
    let trailers = response.trailers().await.unwrap().unwrap();
    assert_eq!(trailers.get("process-state").unwrap(), "exit status 3");
}

#[tokio::test]
async fn a_command_missing_from_every_search_path_is_unprocessable() {
    let daemon = Daemon::start().await;
    let body = exec_form(&[("cmd", "definitely-not-a-real-binary")]);

    let response = Daemon::client()
        .post(daemon.url("/exec"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn client_disconnect_kills_the_child_process_tree() {
    let daemon = Daemon::start().await;
    let marker = daemon.workdir.path().join("pid");
    let script = format!("echo $$ > {}; sleep 30", marker.display());
    let body = exec_form(&[("cmd", "/bin/sh"), ("mode", "sys"), ("cmdArg", "-c"), ("cmdArg", &script)]);

    let response = Daemon::client()
        .post(daemon.url("/exec"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let pid = wait_for_pid(&marker).await;

    // Dropping the response without reading it to EOF closes the
    // connection out from under the still-streaming handler.
    drop(response);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!process_alive(pid), "child {pid} should have been killed");
}

async fn wait_for_pid(marker: &std::path::Path) -> i32 {
    for _ in 0..50 {
        if let Ok(contents) = std::fs::read_to_string(marker) {
            if let Ok(pid) = contents.trim().parse() {
                return pid;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("child never wrote its pid to {}", marker.display());
}

fn process_alive(pid: i32) -> bool {
    std::path::Path::new(&format!("/proc/{pid}")).exists()
}
