// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PATH`-like environment variable composition and env-list deduplication.
//!
//! Placeholders `$PATH`, `$WORKDIR`, `$EMPTY` are substituted into a
//! sequence of path elements, empty elements are dropped, and the result
//! is joined with the target platform's list separator. The `changed`
//! flag lets callers skip appending a no-op PATH entry.

use std::collections::HashMap;

use crate::platform::Platform;

/// Result of composing a PATH-like variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCompose {
    /// The variable's name (`PATH`, or `path` on the research OS).
    pub key: String,
    /// The fully substituted, joined value.
    pub value: String,
    /// False iff `value` equals the variable's original value in `env`.
    pub changed: bool,
}

impl PathCompose {
    /// Render as a `key=value` string suitable for appending to an env list.
    pub fn as_env_entry(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

/// Find the last value bound to `var_name` in `env`, honoring per-platform
/// case sensitivity. `env` entries are `key=value` strings; later entries
/// for the same key win.
fn find_last<'a>(platform: Platform, env: &'a [String], var_name: &str) -> Option<&'a str> {
    let mut found = None;
    for entry in env {
        let Some(idx) = entry.find('=') else {
            continue;
        };
        let key = &entry[..idx];
        let matches = if platform.case_insensitive_env() {
            key.eq_ignore_ascii_case(var_name)
        } else {
            key == var_name
        };
        if matches {
            found = Some(&entry[idx + 1..]);
        }
    }
    found
}

/// Substitute `$PATH` / `$WORKDIR` / `$EMPTY` placeholders in one path
/// element.
fn substitute(elem: &str, current_path: &str, workdir: &str) -> String {
    if elem == "$PATH" {
        current_path.to_string()
    } else if elem == "$EMPTY" {
        String::new()
    } else if let Some(rest) = elem.strip_prefix("$WORKDIR") {
        format!("{workdir}{rest}")
    } else {
        elem.to_string()
    }
}

/// Compose the PATH-like variable for `platform` from `path_elems`,
/// consulting `env` for the current value of `$PATH` and `workdir` for
/// `$WORKDIR`. See spec §4.1 for the substitution rules.
pub fn compose_path_var(
    platform: Platform,
    env: &[String],
    path_elems: &[String],
    workdir: &str,
) -> PathCompose {
    let key = platform.path_var_name().to_string();
    let current = find_last(platform, env, &key).unwrap_or("").to_string();

    let joined = path_elems
        .iter()
        .map(|elem| substitute(elem, &current, workdir))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(platform.path_list_sep());

    let changed = joined != current;

    PathCompose {
        key,
        value: joined,
        changed,
    }
}

/// Deduplicate a list of `key=value` env entries, keeping the last value
/// set for each key (case-insensitive key comparison on Windows) while
/// preserving the order of each key's first occurrence.
pub fn dedup_env(platform: Platform, env: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut last: HashMap<String, (String, String)> = HashMap::new();

    for entry in env {
        let Some(idx) = entry.find('=') else {
            continue;
        };
        let key = &entry[..idx];
        let value = &entry[idx + 1..];
        let canon = if platform.case_insensitive_env() {
            key.to_ascii_uppercase()
        } else {
            key.to_string()
        };
        if !last.contains_key(&canon) {
            order.push(canon.clone());
        }
        last.insert(canon, (key.to_string(), value.to_string()));
    }

    order
        .into_iter()
        .filter_map(|canon| last.remove(&canon))
        .map(|(k, v)| format!("{k}={v}"))
        .collect()
}

#[cfg(test)]
#[path = "pathenv_tests.rs"]
mod tests;
