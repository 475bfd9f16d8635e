// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized access to the handful of environment variables that tune
//! daemon behavior but aren't part of [`crate::config::Config`] (which
//! flows through the flag/env/file precedence chain instead).

use std::time::Duration;

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Reported in `GET /status` and the reverse-mode upgrade request.
pub const PROTOCOL_VERSION: &str = "1";

/// How long `/halt` waits for in-flight `/exec` requests to finish before
/// the process exits regardless.
pub fn drain_timeout() -> Duration {
    parsed::<u64>("BUILDLET_DRAIN_TIMEOUT_SECS")
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30))
}

/// How long the reverse-mode connection tolerates the coordinator going
/// quiet before it's declared idle and the daemon redials. Overrides the
/// default baked into `buildlet_net::ReverseListener`.
pub fn reverse_idle_timeout() -> Duration {
    parsed::<u64>("BUILDLET_REVERSE_IDLE_SECS")
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(60))
}

/// Directory `tracing-appender` rolls daemon logs into; stderr-only if unset.
pub fn log_dir() -> Option<String> {
    std::env::var("BUILDLET_LOG_DIR").ok()
}

/// What `/halt` does after its teardown delay, selected by static
/// configuration rather than a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltMode {
    Halt,
    Reboot,
    /// Just exit the process; the right choice for an ephemeral VM.
    Exit,
}

pub fn halt_mode() -> HaltMode {
    match std::env::var("BUILDLET_HALT_MODE").as_deref() {
        Ok("halt") => HaltMode::Halt,
        Ok("reboot") => HaltMode::Reboot,
        _ => HaltMode::Exit,
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod env_tests;
