// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn normalize_strips_trailing_slash_for_existing_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let with_slash = PathBuf::from(format!("{}/", tmp.path().display()));
    let normalized = normalize_project_path(&with_slash);
    assert_eq!(normalized, tmp.path().canonicalize().unwrap());
}

#[test]
fn normalize_resolves_relative_components_for_missing_path() {
    let normalized = normalize_project_path(Path::new("/a/b/../c/./d"));
    assert_eq!(normalized, PathBuf::from("/a/c/d"));
}

#[test]
fn normalize_of_same_existing_dir_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let once = normalize_project_path(tmp.path());
    let twice = normalize_project_path(&once);
    assert_eq!(once, twice);
}
