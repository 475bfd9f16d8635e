// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{self, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::Builder;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EgressError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Packs `src` into a gzip-compressed tar stream written to `writer`, for
/// `GET /tgz`. Symlinks under `src` are carried through as tar symlink
/// entries rather than followed, matching how `/writetgz` lays them back
/// down.
pub fn write_tar_gz<W: Write>(src: &Path, writer: W) -> Result<(), EgressError> {
    let encoder = GzEncoder::new(writer, Compression::default());
    let mut builder = Builder::new(encoder);
    builder
        .append_dir_all(".", src)
        .map_err(|source| EgressError::Io {
            path: src.to_path_buf(),
            source,
        })?;
    let encoder = builder.into_inner().map_err(|source| EgressError::Io {
        path: src.to_path_buf(),
        source,
    })?;
    encoder.finish().map_err(|source| EgressError::Io {
        path: src.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "egress_tests.rs"]
mod egress_tests;
