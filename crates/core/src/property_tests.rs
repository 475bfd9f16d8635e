// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quantified invariants from spec §8.

use proptest::prelude::*;

use crate::path::validate_relative_path;
use crate::pathenv::compose_path_var;
use crate::platform::Platform;

fn path_component() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,8}".prop_filter("not a dot-dot", |s| s != "..")
}

fn relative_path_string() -> impl Strategy<Value = String> {
    prop::collection::vec(path_component(), 1..6).prop_map(|parts| parts.join("/"))
}

proptest! {
    /// Every path accepted by the validator stays relative and carries no
    /// `..` component -- it can only ever resolve under the workdir root.
    #[test]
    fn accepted_paths_never_escape(input in relative_path_string()) {
        if let Ok(out) = validate_relative_path(Platform::Unix, &input) {
            prop_assert!(!out.split('/').any(|c| c == ".."));
            prop_assert!(!out.starts_with('/'));
        }
    }

    /// The composed PATH value is the substituted elements joined by the
    /// target's separator, and `changed` tracks equality with the original.
    #[test]
    fn compose_changed_flag_matches_equality(
        elems in prop::collection::vec(path_component(), 0..4),
        original in path_component(),
    ) {
        let env = vec![format!("PATH={original}")];
        let out = compose_path_var(Platform::Unix, &env, &elems, "/workdir");
        let expected_changed = out.value != original;
        prop_assert_eq!(out.changed, expected_changed);
    }
}
