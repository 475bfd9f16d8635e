// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-process sshd strategy, used on hosts that carry no system
//! sshd binary at all (most mobile and embedded builder images). Unlike
//! the other two strategies this needs a real SSH implementation, since
//! nothing in the retrieval pack ships one; `russh` is the deliberate
//! exception noted in the design ledger.

use std::io;
use std::sync::Arc;

use russh::server::{Auth, Config, Handler, Msg, Server as _, Session};
use russh::{Channel, ChannelId};
use russh_keys::key::KeyPair;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum EmbeddedError {
    #[error("failed to generate host key: {0}")]
    KeyGen(#[source] russh_keys::Error),
    #[error("sshd listener failed: {0}")]
    Io(#[source] io::Error),
}

/// Starts an embedded SSH server bound to `port` that accepts only
/// connections presenting `authorized_key` and runs commands through a
/// plain shell, no PTY allocation.
pub async fn spawn_embedded_server(
    port: u16,
    authorized_key: String,
) -> Result<tokio::task::JoinHandle<()>, EmbeddedError> {
    let host_key = KeyPair::generate_ed25519().ok_or_else(|| {
        EmbeddedError::KeyGen(russh_keys::Error::CouldNotReadKey)
    })?;

    let config = Arc::new(Config {
        keys: vec![host_key],
        ..Config::default()
    });

    let mut server = EmbeddedServer { authorized_key };
    server
        .run_on_address(config, ("0.0.0.0", port))
        .await
        .map_err(|e| EmbeddedError::Io(io::Error::other(e.to_string())))?;

    Ok(tokio::spawn(async {}))
}

#[derive(Clone)]
struct EmbeddedServer {
    authorized_key: String,
}

impl russh::server::Server for EmbeddedServer {
    type Handler = EmbeddedHandler;

    fn new_client(&mut self, _addr: Option<std::net::SocketAddr>) -> Self::Handler {
        EmbeddedHandler {
            authorized_key: self.authorized_key.clone(),
        }
    }
}

struct EmbeddedHandler {
    authorized_key: String,
}

#[async_trait::async_trait]
impl Handler for EmbeddedHandler {
    type Error = russh::Error;

    async fn auth_publickey(
        self,
        _user: &str,
        public_key: &russh_keys::key::PublicKey,
    ) -> Result<(Self, Auth), Self::Error> {
        let presented = public_key.to_openssh().unwrap_or_default();
        let accepted = presented.trim() == self.authorized_key.trim();
        let auth = if accepted {
            Auth::Accept
        } else {
            Auth::Reject {
                proceed_with_methods: None,
            }
        };
        Ok((self, auth))
    }

    async fn channel_open_session(
        self,
        _channel: Channel<Msg>,
        session: Session,
    ) -> Result<(Self, bool, Session), Self::Error> {
        Ok((self, true, session))
    }

    async fn exec_request(
        self,
        channel: ChannelId,
        data: &[u8],
        mut session: Session,
    ) -> Result<(Self, Session), Self::Error> {
        let command = String::from_utf8_lossy(data).into_owned();
        let output = Command::new("/bin/sh")
            .arg("-c")
            .arg(&command)
            .output()
            .await;
        match output {
            Ok(out) => {
                session.data(channel, out.stdout.into());
                session.exit_status_request(channel, out.status.code().unwrap_or(1) as u32);
            }
            Err(_) => {
                session.exit_status_request(channel, 127);
            }
        }
        session.close(channel);
        Ok((self, session))
    }
}

#[cfg(test)]
#[path = "embedded_tests.rs"]
mod embedded_tests;
