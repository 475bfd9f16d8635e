// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum AndroidError {
    #[error("failed to run adb: {0}")]
    Spawn(#[source] io::Error),
    #[error("emulator `{serial}` is not in the `device` state (reported `{state}`)")]
    NotLive { serial: String, state: String },
}

/// Android builders run their test harness against an emulator the
/// daemon doesn't own; before handing off a command that talks to it,
/// confirm the emulator is actually up via `adb get-state` rather than
/// letting the command fail deep inside the test harness.
pub async fn check_emulator_liveness(adb_path: &str, serial: &str) -> Result<(), AndroidError> {
    let output = Command::new(adb_path)
        .arg("-s")
        .arg(serial)
        .arg("get-state")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(AndroidError::Spawn)?;

    let state = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if state == "device" {
        Ok(())
    } else {
        Err(AndroidError::NotLive { serial: serial.to_string(), state })
    }
}

#[cfg(test)]
#[path = "android_tests.rs"]
mod android_tests;
