// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

const KEY_A: &str = "ssh-ed25519 AAAAexample builder@example.com";
const KEY_B: &str = "ssh-ed25519 AAAAother builder2@example.com";

#[test]
fn creates_ssh_dir_and_authorized_keys_file() {
    let home = tempdir().unwrap();
    ensure_authorized_key(home.path(), KEY_A).unwrap();

    let keys_path = home.path().join(".ssh/authorized_keys");
    assert!(keys_path.exists());
    assert_eq!(fs::read_to_string(keys_path).unwrap().trim(), KEY_A);
}

#[test]
fn appending_the_same_key_twice_is_idempotent() {
    let home = tempdir().unwrap();
    ensure_authorized_key(home.path(), KEY_A).unwrap();
    ensure_authorized_key(home.path(), KEY_A).unwrap();

    let keys_path = home.path().join(".ssh/authorized_keys");
    let content = fs::read_to_string(keys_path).unwrap();
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn appending_a_second_distinct_key_keeps_both() {
    let home = tempdir().unwrap();
    ensure_authorized_key(home.path(), KEY_A).unwrap();
    ensure_authorized_key(home.path(), KEY_B).unwrap();

    let keys_path = home.path().join(".ssh/authorized_keys");
    let content = fs::read_to_string(keys_path).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[cfg(unix)]
#[test]
fn sets_expected_permission_bits() {
    use std::os::unix::fs::PermissionsExt;

    let home = tempdir().unwrap();
    ensure_authorized_key(home.path(), KEY_A).unwrap();

    let dir_mode = fs::metadata(home.path().join(".ssh"))
        .unwrap()
        .permissions()
        .mode()
        & 0o777;
    let file_mode = fs::metadata(home.path().join(".ssh/authorized_keys"))
        .unwrap()
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(dir_mode, 0o700);
    assert_eq!(file_mode, 0o600);
}
