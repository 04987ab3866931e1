// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn project_hash_is_stable_and_bounded() {
    let a = project_hash("/srv/app");
    let b = project_hash("/srv/app");
    let c = project_hash("/srv/other");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 16);
}

#[test]
fn runner_lock_path_is_keyed_by_project_hash() {
    let state_dir = PathBuf::from("/state");
    let path = runner_lock_path(&state_dir, "/srv/app");
    assert_eq!(
        path,
        state_dir.join("locks").join(format!("{}.lock", project_hash("/srv/app")))
    );
}

#[test]
fn default_workspace_root_nests_under_project_hash() {
    let state_dir = PathBuf::from("/state");
    let root = default_workspace_root(&state_dir, "/srv/app");
    assert_eq!(root, state_dir.join("workspaces").join(project_hash("/srv/app")));
}

#[test]
fn agent_command_defaults_to_claude_when_unset() {
    if std::env::var_os("STEROIDS_AGENT_COMMAND").is_none() {
        assert_eq!(agent_command(), "claude");
    }
}

#[test]
fn hook_command_is_none_when_unset() {
    if std::env::var_os("STEROIDS_HOOK_COMMAND").is_none() {
        assert!(hook_command().is_none());
    }
}
