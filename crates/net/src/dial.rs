// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reverse-mode dialing: connect to the coordinator (through an HTTP
//! `CONNECT` proxy if one is configured), optionally wrap in TLS, and send
//! the upgrade request that hands this connection over to the HTTP
//! server's accept loop.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::{rustls, TlsConnector};

use buildlet_wire::{
    HEADER_BUILDER_HOSTNAME, HEADER_BUILDER_KEY, HEADER_BUILDER_VERSION, HEADER_HOST_TYPE,
    HEADER_REVDIAL_VERSION,
};

const TLS_HANDSHAKE_DEADLINE: Duration = Duration::from_secs(30);
const REVDIAL_VERSION: &str = "2";

#[derive(Debug, Error)]
pub enum DialError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("CONNECT proxy refused the tunnel: {0}")]
    ProxyRefused(String),
    #[error("CONNECT proxy over-read past the response headers")]
    ProxyOverRead,
    #[error("TLS handshake did not complete within {TLS_HANDSHAKE_DEADLINE:?}")]
    TlsTimeout,
    #[error("TLS handshake failed: {0}")]
    Tls(#[source] io::Error),
    #[error("upgrade request failed: {0}")]
    Upgrade(#[source] io::Error),
    #[error("coordinator did not upgrade the connection (status: {0})")]
    NotUpgraded(String),
}

pub struct UpgradeRequest {
    pub host_type: String,
    pub builder_key: String,
    pub builder_hostname: String,
    pub builder_version: String,
}

impl UpgradeRequest {
    fn headers(&self) -> Vec<(String, String)> {
        vec![
            (HEADER_HOST_TYPE.to_string(), self.host_type.clone()),
            (HEADER_BUILDER_KEY.to_string(), self.builder_key.clone()),
            (
                HEADER_BUILDER_HOSTNAME.to_string(),
                self.builder_hostname.clone(),
            ),
            (
                HEADER_BUILDER_VERSION.to_string(),
                self.builder_version.clone(),
            ),
            (
                HEADER_REVDIAL_VERSION.to_string(),
                REVDIAL_VERSION.to_string(),
            ),
        ]
    }
}

/// Dials `addr` directly, or tunnels through `proxy_addr` via HTTP
/// `CONNECT` when one is configured.
pub async fn dial(addr: &str, proxy_addr: Option<&str>) -> Result<TcpStream, DialError> {
    match proxy_addr {
        Some(proxy) => dial_via_connect_proxy(proxy, addr).await,
        None => TcpStream::connect(addr)
            .await
            .map_err(|source| DialError::Connect {
                addr: addr.to_string(),
                source,
            }),
    }
}

async fn dial_via_connect_proxy(proxy_addr: &str, target: &str) -> Result<TcpStream, DialError> {
    let mut stream =
        TcpStream::connect(proxy_addr)
            .await
            .map_err(|source| DialError::Connect {
                addr: proxy_addr.to_string(),
                source,
            })?;

    let request = format!("CONNECT {target} HTTP/1.1\r\nHost: {target}\r\n\r\n");
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|source| DialError::Connect {
            addr: proxy_addr.to_string(),
            source,
        })?;

    let mut reader = BufReader::new(stream);
    let status_line = read_line(&mut reader)
        .await
        .map_err(|source| DialError::Connect {
            addr: proxy_addr.to_string(),
            source,
        })?;
    drain_headers(&mut reader)
        .await
        .map_err(|source| DialError::Connect {
            addr: proxy_addr.to_string(),
            source,
        })?;

    if !status_line.contains(" 200 ") {
        return Err(DialError::ProxyRefused(status_line));
    }

    // The proxy must not have pipelined any bytes past the blank line that
    // ends its response -- those would belong to the tunneled protocol and
    // get silently dropped by `into_inner`, corrupting the handshake that
    // follows.
    if !reader.buffer().is_empty() {
        return Err(DialError::ProxyOverRead);
    }
    Ok(reader.into_inner())
}

/// Wraps `stream` in TLS, bounded by [`TLS_HANDSHAKE_DEADLINE`].
pub async fn handshake_tls(
    stream: TcpStream,
    server_name: &str,
    tls_config: Arc<rustls::ClientConfig>,
) -> Result<tokio_rustls::client::TlsStream<TcpStream>, DialError> {
    let connector = TlsConnector::from(tls_config);
    let name = ServerName::try_from(server_name.to_string())
        .map_err(|e| DialError::Tls(io::Error::other(e)))?;

    timeout(TLS_HANDSHAKE_DEADLINE, connector.connect(name, stream))
        .await
        .map_err(|_| DialError::TlsTimeout)?
        .map_err(DialError::Tls)
}

/// Sends the reverse-mode upgrade request over an already-connected
/// stream and confirms the coordinator answered with `101`.
pub async fn send_upgrade_request<S>(stream: &mut S, req: &UpgradeRequest) -> Result<(), DialError>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let mut request = String::from("GET /reverse HTTP/1.1\r\nConnection: Upgrade\r\nUpgrade: revdial\r\n");
    for (name, value) in req.headers() {
        request.push_str(&format!("{name}: {value}\r\n"));
    }
    request.push_str("\r\n");

    stream
        .write_all(request.as_bytes())
        .await
        .map_err(DialError::Upgrade)?;

    let mut reader = BufReader::new(stream);
    let status_line = read_line(&mut reader).await.map_err(DialError::Upgrade)?;
    drain_headers(&mut reader).await.map_err(DialError::Upgrade)?;

    if !status_line.contains(" 101 ") {
        return Err(DialError::NotUpgraded(status_line));
    }
    Ok(())
}

async fn read_line<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    Ok(line.trim_end().to_string())
}

async fn drain_headers<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> io::Result<()> {
    loop {
        let line = read_line(reader).await?;
        if line.is_empty() {
            return Ok(());
        }
    }
}

#[cfg(test)]
#[path = "dial_tests.rs"]
mod dial_tests;
