// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serves one HTTP connection over an arbitrary byte stream (plain TCP in
//! listen mode, `rustls`-wrapped TCP in listen mode with TLS configured,
//! or the revdial-upgraded stream in reverse mode). Upgrades are enabled
//! so `/connect-ssh`'s `101 Switching Protocols` hijack works.

use axum::body::Body;
use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::io::{AsyncRead, AsyncWrite};
use tower::Service;
use tracing::debug;

pub async fn serve_connection<S>(io: S, router: Router)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let io = TokioIo::new(io);
    let hyper_service = hyper::service::service_fn(move |request: hyper::Request<hyper::body::Incoming>| {
        let mut router = router.clone();
        async move { router.call(request.map(Body::new)).await }
    });

    if let Err(err) = ConnBuilder::new(TokioExecutor::new())
        .serve_connection_with_upgrades(io, hyper_service)
        .await
    {
        debug!(error = %err, "connection ended");
    }
}
