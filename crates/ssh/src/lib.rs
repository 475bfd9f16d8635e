// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/connect-ssh` support: authorized-key provisioning, sshd startup
//! across three strategies, and the bridge between an upgraded HTTP
//! connection and the local sshd port.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod authorized_keys;
mod bridge;
mod embedded;
mod sshd;

pub use authorized_keys::{ensure_authorized_key, AuthorizedKeyError};
pub use bridge::{bridge_streams, BridgeError};
pub use embedded::{spawn_embedded_server, EmbeddedError};
pub use sshd::{
    select_port, spawn_foreground, start_via_service_manager, SshdError, SshdStrategy,
};
