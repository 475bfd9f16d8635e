// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The HTTP-Basic password gate. Username is ignored; an empty
//! configured password disables the check entirely (used by `/` and
//! `/healthz`'s callers in development, and matches every other endpoint
//! when no `--password` was ever configured).

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

use crate::error::AppError;
use crate::state::AppState;

pub async fn require_password(
    State(state): State<AppState>,
    basic: Option<TypedHeader<Authorization<Basic>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config().password.as_deref() else {
        return Ok(next.run(request).await);
    };
    if expected.is_empty() {
        return Ok(next.run(request).await);
    }

    match basic {
        Some(TypedHeader(auth)) if auth.password() == expected => Ok(next.run(request).await),
        _ => Err(AppError::Forbidden),
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod auth_tests;
