// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use buildlet_core::Platform;
use yare::parameterized;

#[parameterized(
    bad_request = { AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST },
    unprocessable = { AppError::Unprocessable("x".into()), StatusCode::UNPROCESSABLE_ENTITY },
    forbidden = { AppError::Forbidden, StatusCode::FORBIDDEN },
    bad_gateway = { AppError::BadGateway("x".into()), StatusCode::BAD_GATEWAY },
    server_failure = { AppError::ServerFailure("x".into()), StatusCode::INTERNAL_SERVER_ERROR },
)]
fn maps_to_expected_status(err: AppError, expected: StatusCode) {
    assert_eq!(err.status(), expected);
}

#[test]
fn client_fault_ingest_error_is_bad_request() {
    let path_err = buildlet_core::validate_relative_path(Platform::Unix, "../escape").unwrap_err();
    let app_err: AppError = IngestError::BadPath(path_err).into();
    assert_eq!(app_err.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn sandbox_miss_is_unprocessable_not_bad_request() {
    let app_err: AppError = ResolveError::NotFoundInSandbox("tool".to_string()).into();
    assert_eq!(app_err.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn bridge_dial_failure_is_bad_gateway() {
    let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    let app_err: AppError = BridgeError::Dial { port: 22, source: io_err }.into();
    assert_eq!(app_err.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn missing_cmd_field_is_bad_request() {
    let app_err: AppError = buildlet_wire::exec_params::ExecParamsError::MissingCmd.into();
    assert_eq!(app_err.status(), StatusCode::BAD_REQUEST);
}
