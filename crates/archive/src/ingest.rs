// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};
use thiserror::Error;

use buildlet_core::{validate_relative_path, PathError, Platform};

/// Ingest failures are split client vs. server so the daemon can map them
/// to the right status code: a malformed archive is the client's fault, a
/// disk failure while extracting it is ours.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("bad path in archive entry: {0}")]
    BadPath(#[from] PathError),
    #[error("malformed tar entry: {0}")]
    MalformedEntry(String),
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IngestError {
    /// True when the client sent something the server can never satisfy,
    /// as opposed to a local filesystem failure.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, IngestError::BadPath(_) | IngestError::MalformedEntry(_))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub files_written: usize,
    pub dirs_created: usize,
    pub symlinks_skipped: usize,
}

fn io_err(path: &Path, source: io::Error) -> IngestError {
    IngestError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Extracts a gzip-compressed tar stream under `dest`, rejecting any entry
/// whose name escapes `dest` and skipping symlinks entirely (the daemon
/// never needs to materialize them and they're a common path-escape
/// vector).
pub fn extract_tar_gz<R: Read>(
    reader: R,
    dest: &Path,
    platform: Platform,
) -> Result<IngestOutcome, IngestError> {
    let decoder = GzDecoder::new(reader);
    let mut archive = Archive::new(decoder);
    let mut outcome = IngestOutcome::default();

    for entry in archive.entries().map_err(|e| io_err(dest, e))? {
        let mut entry = entry.map_err(|e| io_err(dest, e))?;
        let entry_type = entry.header().entry_type();

        if entry_type == EntryType::Symlink || entry_type == EntryType::Link {
            outcome.symlinks_skipped += 1;
            continue;
        }

        let raw_name = entry
            .path()
            .map_err(|e| IngestError::MalformedEntry(e.to_string()))?
            .to_string_lossy()
            .into_owned();
        let safe_rel = validate_relative_path(platform, &raw_name)?;
        let target = dest.join(&safe_rel);

        if entry_type == EntryType::Directory {
            fs::create_dir_all(&target).map_err(|e| io_err(&target, e))?;
            outcome.dirs_created += 1;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        // macOS refuses to let you overwrite a running or code-signed
        // binary's bytes in place; unlinking first and writing a fresh
        // inode sidesteps the signature cache entirely. Harmless
        // elsewhere so it's unconditional.
        if target.exists() {
            fs::remove_file(&target).map_err(|e| io_err(&target, e))?;
        }

        let mut out = fs::File::create(&target).map_err(|e| io_err(&target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| io_err(&target, e))?;
        drop(out);

        let mtime = clamp_mtime(entry.header().mtime().unwrap_or(0));
        let _ = filetime_now_or(&target, mtime);

        #[cfg(unix)]
        if let Ok(mode) = entry.header().mode() {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&target, fs::Permissions::from_mode(mode));
        }

        outcome.files_written += 1;
    }

    Ok(outcome)
}

/// A zero or implausibly old mtime (pre-1980, the FAT/tar epoch floor)
/// is replaced with the extraction time instead of being preserved
/// verbatim.
fn clamp_mtime(unix_secs: u64) -> SystemTime {
    const FAT_EPOCH: u64 = 315_532_800; // 1980-01-01 UTC
    if unix_secs < FAT_EPOCH {
        SystemTime::now()
    } else {
        SystemTime::UNIX_EPOCH + Duration::from_secs(unix_secs)
    }
}

fn filetime_now_or(path: &Path, mtime: SystemTime) -> io::Result<()> {
    let file = fs::File::options().write(true).open(path)?;
    file.set_modified(mtime)
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod ingest_tests;
