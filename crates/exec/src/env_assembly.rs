// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use buildlet_core::{compose_path_var, dedup_env, CachePaths, Platform};

/// Assembles the final `key=value` environment for a spawned command: the
/// daemon's own base environment, the cache-directory exports, the
/// client-supplied `env` entries, a composed `PATH` built from the
/// client's `path` entries, all deduplicated with last-value-wins.
pub fn assemble_env(
    platform: Platform,
    base_env: &[String],
    cache_paths: &CachePaths,
    client_env: &[String],
    client_path_elems: &[String],
    workdir: &Path,
) -> Vec<String> {
    let mut combined: Vec<String> = Vec::new();
    combined.extend(base_env.iter().cloned());
    combined.extend(cache_paths.as_env_entries());
    combined.extend(client_env.iter().cloned());

    if !client_path_elems.is_empty() {
        let composed = compose_path_var(
            platform,
            &combined,
            client_path_elems,
            &workdir.display().to_string(),
        );
        combined.push(composed.as_env_entry());
    }

    dedup_env(platform, &combined)
}

#[cfg(test)]
#[path = "env_assembly_tests.rs"]
mod env_assembly_tests;
