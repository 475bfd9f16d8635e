// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn choose_strategy_picks_embedded_for_mobile_host_types() {
    assert_eq!(choose_strategy("android-arm64"), SshdStrategy::Embedded);
    assert_eq!(choose_strategy("ios-arm64"), SshdStrategy::Embedded);
}

#[test]
fn choose_strategy_picks_service_manager_for_bsd_host_types() {
    assert_eq!(choose_strategy("openbsd-amd64"), SshdStrategy::ServiceManager);
    assert_eq!(choose_strategy("freebsd-amd64"), SshdStrategy::ServiceManager);
}

#[test]
fn choose_strategy_defaults_to_foreground_subprocess() {
    assert_eq!(choose_strategy("linux-amd64"), SshdStrategy::ForegroundSubprocess);
}

#[test]
#[serial]
fn home_dir_for_current_user_uses_home_env() {
    std::env::set_var("USER", "buildbot");
    std::env::set_var("HOME", "/var/lib/buildbot");
    assert_eq!(home_dir_for("buildbot"), PathBuf::from("/var/lib/buildbot"));
    std::env::remove_var("USER");
    std::env::remove_var("HOME");
}

#[test]
#[serial]
fn home_dir_for_other_user_falls_back_to_conventional_path() {
    std::env::set_var("USER", "buildbot");
    std::env::set_var("HOME", "/var/lib/buildbot");
    assert_eq!(home_dir_for("gopher"), PathBuf::from("/home/gopher"));
    std::env::remove_var("USER");
    std::env::remove_var("HOME");
}
