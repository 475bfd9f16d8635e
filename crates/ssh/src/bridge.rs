// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to dial local sshd on port {port}: {source}")]
    Dial {
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("copy between upgraded connection and sshd failed: {0}")]
    Copy(#[source] io::Error),
}

/// Bridges a full-duplex upgraded HTTP connection to the local sshd port,
/// for `/connect-ssh` once the 101 response has gone out. Returns once
/// either side closes.
pub async fn bridge_streams<S>(mut upgraded: S, port: u16) -> Result<(), BridgeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut sshd = TcpStream::connect(("127.0.0.1", port))
        .await
        .map_err(|source| BridgeError::Dial { port, source })?;

    tokio::io::copy_bidirectional(&mut upgraded, &mut sshd)
        .await
        .map_err(BridgeError::Copy)?;
    Ok(())
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod bridge_tests;
