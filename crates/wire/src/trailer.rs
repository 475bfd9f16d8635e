// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The HTTP trailer `/exec` uses to carry a process's final state after its
//! combined stdout/stderr stream has been written out.

use std::fmt;

/// Trailer name the exec handler declares via `Trailer` and emits once the
/// child process has exited.
pub const PROCESS_STATE_TRAILER: &str = "Process-State";

/// A process's terminal state, rendered into the `Process-State` trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessState {
    /// The process ran to completion with the given exit code.
    Exited(i32),
    /// The process was terminated by a signal, e.g. "signal: killed".
    Signaled(String),
    /// The process never started (command resolution or spawn failure).
    Error(String),
}

impl ProcessState {
    pub fn from_exit_code(code: i32) -> Self {
        ProcessState::Exited(code)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Exited(code) => write!(f, "exit status {code}"),
            ProcessState::Signaled(sig) => write!(f, "signal: {sig}"),
            ProcessState::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

#[cfg(test)]
#[path = "trailer_tests.rs"]
mod trailer_tests;
