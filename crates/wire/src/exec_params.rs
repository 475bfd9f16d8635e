// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Form fields accepted by `POST /exec`. The form carries repeated
//! `cmdArg`, `env`, and `path` keys, which the standard `Form` extractor
//! collapses to their last occurrence, so callers parse the raw
//! `application/x-www-form-urlencoded` body with [`ExecParams::from_pairs`].

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecParamsError {
    #[error("missing required field `cmd`")]
    MissingCmd,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecParams {
    pub cmd: String,
    pub cmd_args: Vec<String>,
    pub env: Vec<String>,
    pub path: Vec<String>,
    pub dir: Option<String>,
    pub sys_mode: bool,
    pub debug: bool,
}

impl ExecParams {
    /// Builds params from decoded `key=value` form pairs, preserving the
    /// order repeated keys appeared in.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ExecParamsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = ExecParams::default();
        let mut cmd = None;
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "cmd" => cmd = Some(value),
                "cmdArg" => params.cmd_args.push(value),
                "env" => params.env.push(value),
                "path" => params.path.push(value),
                "dir" => params.dir = Some(value),
                "mode" => params.sys_mode = value == "sys",
                "debug" => params.debug = value == "1" || value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }
        params.cmd = cmd.ok_or(ExecParamsError::MissingCmd)?;
        Ok(params)
    }
}

#[cfg(test)]
#[path = "exec_params_tests.rs"]
mod exec_params_tests;
