// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::io::duplex;
use tokio::net::TcpListener;

#[tokio::test]
async fn dial_failure_on_a_closed_port_is_reported() {
    // Port 0 never has anything listening once bound-and-dropped, and is
    // never reused by the OS for the duration of this test.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let (client_side, _server_side) = duplex(64);
    let err = bridge_streams(client_side, port).await.unwrap_err();
    assert!(matches!(err, BridgeError::Dial { .. }));
}

#[tokio::test]
async fn bridges_bytes_in_both_directions() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let echo = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 5];
        tokio::io::AsyncReadExt::read_exact(&mut sock, &mut buf)
            .await
            .unwrap();
        tokio::io::AsyncWriteExt::write_all(&mut sock, &buf)
            .await
            .unwrap();
    });

    let (mut client_side, server_side) = duplex(64);
    let bridging = tokio::spawn(bridge_streams(server_side, port));

    tokio::io::AsyncWriteExt::write_all(&mut client_side, b"hello")
        .await
        .unwrap();
    let mut echoed = [0u8; 5];
    tokio::io::AsyncReadExt::read_exact(&mut client_side, &mut echoed)
        .await
        .unwrap();
    assert_eq!(&echoed, b"hello");

    echo.await.unwrap();
    drop(client_side);
    let _ = bridging.await.unwrap();
}
