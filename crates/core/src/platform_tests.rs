// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    windows = { "windows", Platform::Windows },
    plan9   = { "plan9",   Platform::Plan9 },
    linux   = { "linux",   Platform::Unix },
    darwin  = { "darwin",  Platform::Unix },
    freebsd = { "freebsd", Platform::Unix },
)]
fn classifies_goos(goos: &str, expected: Platform) {
    assert_eq!(Platform::from_goos(goos), expected);
}

#[yare::parameterized(
    windows = { Platform::Windows, "PATH", ";" },
    plan9   = { Platform::Plan9,   "path", "\0" },
    unix    = { Platform::Unix,    "PATH", ":" },
)]
fn var_name_and_separator(platform: Platform, name: &str, sep: &str) {
    assert_eq!(platform.path_var_name(), name);
    assert_eq!(platform.path_list_sep(), sep);
}

#[test]
fn only_windows_is_case_insensitive() {
    assert!(Platform::Windows.case_insensitive_env());
    assert!(!Platform::Plan9.case_insensitive_env());
    assert!(!Platform::Unix.case_insensitive_env());
}

#[test]
fn only_windows_has_drive_letters() {
    assert!(Platform::Windows.has_drive_letters());
    assert!(!Platform::Unix.has_drive_letters());
}
