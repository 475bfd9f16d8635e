// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps every crate's error enums to the five HTTP-visible error kinds.
//! A non-zero child exit is never an [`AppError`] -- it travels out of
//! band in the `Process-State` trailer, see `buildlet_wire::trailer`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use buildlet_archive::{EgressError, IngestError};
use buildlet_core::{PathError, WorkdirError};
use buildlet_exec::{AndroidError, NetworkLockdownError, ResolveError, RunError};
use buildlet_ssh::{AuthorizedKeyError, BridgeError, EmbeddedError, SshdError};
use buildlet_wire::exec_params::ExecParamsError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unprocessable(String),
    Forbidden,
    BadGateway(String),
    ServerFailure(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::ServerFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::BadRequest(m) | AppError::Unprocessable(m) => m.clone(),
            AppError::Forbidden => "forbidden".to_string(),
            AppError::BadGateway(m) => m.clone(),
            AppError::ServerFailure(m) => m.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR || status == StatusCode::BAD_GATEWAY {
            error!(%status, message = %self.message(), "request failed");
        }
        (status, self.message()).into_response()
    }
}

impl From<PathError> for AppError {
    fn from(e: PathError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<WorkdirError> for AppError {
    fn from(e: WorkdirError) -> Self {
        AppError::ServerFailure(e.to_string())
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        if e.is_client_fault() {
            AppError::BadRequest(e.to_string())
        } else {
            AppError::ServerFailure(e.to_string())
        }
    }
}

impl From<EgressError> for AppError {
    fn from(e: EgressError) -> Self {
        AppError::ServerFailure(e.to_string())
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::BadDir(path_err) => AppError::BadRequest(path_err.to_string()),
            ResolveError::NotFoundInSandbox(_) => AppError::Unprocessable(e.to_string()),
        }
    }
}

impl From<RunError> for AppError {
    fn from(e: RunError) -> Self {
        AppError::ServerFailure(e.to_string())
    }
}

impl From<AndroidError> for AppError {
    fn from(e: AndroidError) -> Self {
        AppError::ServerFailure(e.to_string())
    }
}

impl From<NetworkLockdownError> for AppError {
    fn from(e: NetworkLockdownError) -> Self {
        AppError::ServerFailure(e.to_string())
    }
}

impl From<AuthorizedKeyError> for AppError {
    fn from(e: AuthorizedKeyError) -> Self {
        AppError::ServerFailure(e.to_string())
    }
}

impl From<SshdError> for AppError {
    fn from(e: SshdError) -> Self {
        AppError::ServerFailure(e.to_string())
    }
}

impl From<BridgeError> for AppError {
    fn from(e: BridgeError) -> Self {
        AppError::BadGateway(e.to_string())
    }
}

impl From<EmbeddedError> for AppError {
    fn from(e: EmbeddedError) -> Self {
        AppError::ServerFailure(e.to_string())
    }
}

impl From<ExecParamsError> for AppError {
    fn from(e: ExecParamsError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::ServerFailure(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
