// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ingest::extract_tar_gz;
use buildlet_core::Platform;
use tempfile::tempdir;

#[test]
fn round_trips_a_directory_tree() {
    let src = tempdir().unwrap();
    std::fs::create_dir_all(src.path().join("a/b")).unwrap();
    std::fs::write(src.path().join("a/b/c.txt"), b"payload").unwrap();

    let mut buf = Vec::new();
    write_tar_gz(src.path(), &mut buf).unwrap();

    let dest = tempdir().unwrap();
    let outcome = extract_tar_gz(std::io::Cursor::new(buf), dest.path(), Platform::Unix).unwrap();

    assert_eq!(outcome.files_written, 1);
    assert_eq!(
        std::fs::read_to_string(dest.path().join("a/b/c.txt")).unwrap(),
        "payload"
    );
}

#[test]
fn empty_directory_produces_a_valid_empty_archive() {
    let src = tempdir().unwrap();
    let mut buf = Vec::new();
    write_tar_gz(src.path(), &mut buf).unwrap();

    let dest = tempdir().unwrap();
    let outcome = extract_tar_gz(std::io::Cursor::new(buf), dest.path(), Platform::Unix).unwrap();
    assert_eq!(outcome.files_written, 0);
}
