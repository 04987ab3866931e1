// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::process::Command as StdCommand;
use tempfile::TempDir;

fn init_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let run = |args: &[&str]| {
        let status = StdCommand::new("git")
            .arg("-C")
            .arg(dir.path())
            .args(args)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    };
    run(&["init", "-q", "-b", "main"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "test"]);
    std::fs::write(dir.path().join("a.txt"), "hello\n").unwrap();
    run(&["add", "."]);
    run(&["commit", "-q", "-m", "initial"]);
    dir
}

#[tokio::test]
async fn is_repo_true_for_git_dir() {
    let dir = init_repo();
    let port = CliGitPort::new();
    assert!(port.is_repo(dir.path()).await.unwrap());
}

#[tokio::test]
async fn is_repo_false_for_plain_dir() {
    let dir = TempDir::new().unwrap();
    let port = CliGitPort::new();
    assert!(!port.is_repo(dir.path()).await.unwrap());
}

#[tokio::test]
async fn has_uncommitted_changes_detects_dirty_worktree() {
    let dir = init_repo();
    let port = CliGitPort::new();
    assert!(!port.has_uncommitted_changes(dir.path()).await.unwrap());
    std::fs::write(dir.path().join("a.txt"), "changed\n").unwrap();
    assert!(port.has_uncommitted_changes(dir.path()).await.unwrap());
}

#[tokio::test]
async fn is_file_tracked_true_for_committed_file() {
    let dir = init_repo();
    let port = CliGitPort::new();
    assert!(port.is_file_tracked(dir.path(), "a.txt").await.unwrap());
    assert!(!port.is_file_tracked(dir.path(), "missing.txt").await.unwrap());
}

#[tokio::test]
async fn file_last_commit_returns_sha_for_tracked_file() {
    let dir = init_repo();
    let port = CliGitPort::new();
    let sha = port.file_last_commit(dir.path(), "a.txt").await.unwrap();
    assert!(sha.is_some());
    assert_eq!(sha.unwrap().len(), 40);

    let missing = port.file_last_commit(dir.path(), "nope.txt").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn file_content_hash_is_stable_and_changes_with_content() {
    let dir = init_repo();
    let port = CliGitPort::new();
    let hash1 = port.file_content_hash(dir.path(), "a.txt").await.unwrap().unwrap();
    let hash2 = port.file_content_hash(dir.path(), "a.txt").await.unwrap().unwrap();
    assert_eq!(hash1, hash2);

    std::fs::write(dir.path().join("a.txt"), "different\n").unwrap();
    let hash3 = port.file_content_hash(dir.path(), "a.txt").await.unwrap().unwrap();
    assert_ne!(hash1, hash3);
}

#[tokio::test]
async fn current_commit_sha_matches_log() {
    let dir = init_repo();
    let port = CliGitPort::new();
    let sha = port.current_commit_sha(dir.path()).await.unwrap();
    assert_eq!(sha.len(), 40);
}

#[tokio::test]
async fn create_and_remove_worktree() {
    let dir = init_repo();
    let port = CliGitPort::new();
    let worktree_dir = TempDir::new().unwrap();
    let clone_path = worktree_dir.path().join("wt");

    port.create_worktree(dir.path(), &clone_path, "feature-x", "main")
        .await
        .unwrap();
    assert!(clone_path.join("a.txt").exists());

    port.remove_worktree(dir.path(), &clone_path).await.unwrap();
    assert!(!clone_path.exists());
}
