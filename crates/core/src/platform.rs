// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-target-OS conventions: `PATH` variable naming, list separators, and
//! path syntax quirks.
//!
//! The buildlet fleet spans many host OSes, most of which agree on the
//! Unix conventions. Two outliers get their own variant: Windows (`;`
//! separator, drive letters, case-insensitive env lookups) and the
//! research OS Plan 9 (lowercase `path`, NUL-separated list, no drive
//! letters).

use std::fmt;

/// The OS a command is targeting, as named in the `GOOS`-style host type
/// string the coordinator advertises (e.g. `"windows"`, `"plan9"`,
/// `"linux"`, `"darwin"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    /// The research OS: lowercase `path`, NUL-separated.
    Plan9,
    /// Everything else (Linux, Darwin, the BSDs, ...).
    Unix,
}

impl Platform {
    /// Classify a `GOOS`-style target name.
    pub fn from_goos(goos: &str) -> Self {
        match goos {
            "windows" => Platform::Windows,
            "plan9" => Platform::Plan9,
            _ => Platform::Unix,
        }
    }

    /// The host's own platform, for when no target is specified.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Name of the PATH-like environment variable on this platform.
    pub fn path_var_name(self) -> &'static str {
        match self {
            Platform::Plan9 => "path",
            _ => "PATH",
        }
    }

    /// Separator joining PATH-like list elements.
    pub fn path_list_sep(self) -> &'static str {
        match self {
            Platform::Windows => ";",
            Platform::Plan9 => "\0",
            Platform::Unix => ":",
        }
    }

    /// Native path-component separator.
    pub fn path_sep(self) -> char {
        match self {
            Platform::Windows => '\\',
            _ => '/',
        }
    }

    /// Whether environment variable name lookups are case-insensitive.
    pub fn case_insensitive_env(self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// Whether this platform has drive letters / UNC volume prefixes.
    pub fn has_drive_letters(self) -> bool {
        matches!(self, Platform::Windows)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Platform::Windows => "windows",
            Platform::Plan9 => "plan9",
            Platform::Unix => "unix",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
