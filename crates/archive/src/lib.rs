// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gzip-tar ingest and egress for `/writetgz` and `GET /tgz`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod egress;
mod ingest;

pub use egress::{write_tar_gz, EgressError};
pub use ingest::{extract_tar_gz, IngestError, IngestOutcome};
