// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workdir lifecycle: the exclusively-owned scratch directory every
//! request operates under.
//!
//! Invariants: the workdir always exists during request handling
//! (endpoints re-create it on demand if deleted); every client-named path
//! is validated (see [`crate::path`]) and joined under it; its entire
//! contents may be deleted at any time by a `/removeall` request.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkdirError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WorkdirError {
    fn io(path: &Path, source: io::Error) -> Self {
        WorkdirError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The three sub-caches every workdir owns, re-created on demand.
#[derive(Debug, Clone)]
pub struct CachePaths {
    pub tmp: PathBuf,
    pub build_cache: PathBuf,
    pub lang_server_cache: PathBuf,
}

impl CachePaths {
    /// Env entries exporting the cache paths to a spawned child.
    pub fn as_env_entries(&self) -> Vec<String> {
        vec![
            format!("TMPDIR={}", self.tmp.display()),
            format!("BUILDLET_BUILD_CACHE={}", self.build_cache.display()),
            format!(
                "BUILDLET_LANG_SERVER_CACHE={}",
                self.lang_server_cache.display()
            ),
        ]
    }
}

/// An exclusively-owned scratch directory.
#[derive(Debug, Clone)]
pub struct Workdir {
    root: PathBuf,
}

impl Workdir {
    pub fn new(root: PathBuf) -> Self {
        Workdir { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute workdir path, as returned by `GET /workdir`.
    pub fn expose(&self) -> String {
        self.root.display().to_string()
    }

    /// Idempotently create the workdir and its sub-caches.
    pub fn ensure(&self) -> Result<CachePaths, WorkdirError> {
        fs::create_dir_all(&self.root).map_err(|e| WorkdirError::io(&self.root, e))?;
        self.ensure_caches()
    }

    /// Re-create the sub-caches in case they were removed by a prior
    /// `/removeall`. Called by `/exec` on every invocation.
    pub fn ensure_caches(&self) -> Result<CachePaths, WorkdirError> {
        let paths = CachePaths {
            tmp: self.root.join("tmp"),
            build_cache: self.root.join("cache").join("build"),
            lang_server_cache: self.root.join("cache").join("lsp"),
        };
        for dir in [&paths.tmp, &paths.build_cache, &paths.lang_server_cache] {
            fs::create_dir_all(dir).map_err(|e| WorkdirError::io(dir, e))?;
        }
        Ok(paths)
    }

    /// Join and recursively delete a workdir-relative path. `rel` is
    /// assumed to already have passed [`crate::path::validate_relative_path`].
    ///
    /// Deleting `""`/`"."` (the workdir root itself) clears its contents
    /// rather than removing the root, since the root must always exist.
    /// A permission error triggers one retry after walking the target
    /// tree and clearing read-only bits.
    pub fn reset(&self, rel: &str) -> Result<(), WorkdirError> {
        if rel.is_empty() || rel == "." {
            return self.clear_contents();
        }
        let target = self.root.join(rel);
        if !target.exists() {
            return Ok(());
        }
        remove_with_retry(&target).map_err(|e| WorkdirError::io(&target, e))
    }

    fn clear_contents(&self) -> Result<(), WorkdirError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(WorkdirError::io(&self.root, e)),
        };
        let mut first_err = None;
        for entry in entries.flatten() {
            if let Err(e) = remove_with_retry(&entry.path()) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            // Tolerate a partial failure (busy mount point, vanishing file)
            // as long as the directory ends up empty.
            Some(e) => {
                if is_empty_dir(&self.root) {
                    Ok(())
                } else {
                    Err(WorkdirError::io(&self.root, e))
                }
            }
            None => Ok(()),
        }
    }
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut it| it.next().is_none())
        .unwrap_or(false)
}

fn remove_with_retry(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            make_writable_recursive(path)?;
            if meta.is_dir() {
                fs::remove_dir_all(path)
            } else {
                fs::remove_file(path)
            }
        }
        Err(e) => Err(e),
    }
}

/// Walk `path` setting the owner-writable bit so a subsequent delete of a
/// read-only tree succeeds.
fn make_writable_recursive(path: &Path) -> io::Result<()> {
    for entry in walkdir::WalkDir::new(path) {
        let entry = entry.map_err(io::Error::other)?;
        let meta = entry.metadata().map_err(io::Error::other)?;
        if meta.permissions().readonly() {
            let mut perms = meta.permissions();
            #[allow(clippy::permissions_set_readonly_false)]
            perms.set_readonly(false);
            fs::set_permissions(entry.path(), perms)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "workdir_tests.rs"]
mod tests;
