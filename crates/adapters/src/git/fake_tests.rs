// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[tokio::test]
async fn defaults_to_clean_tracked_repo() {
    let fake = FakeGitPort::new();
    let path = Path::new("/proj");
    assert!(fake.is_repo(path).await.unwrap());
    assert!(!fake.has_uncommitted_changes(path).await.unwrap());
}

#[tokio::test]
async fn push_records_call_and_can_fail() {
    let fake = FakeGitPort::new();
    let path = Path::new("/proj");
    fake.push(path, "main", "origin").await.unwrap();
    assert_eq!(fake.pushes().len(), 1);

    fake.set_push_error("rejected");
    let err = fake.push(path, "main", "origin").await.unwrap_err();
    assert!(matches!(err, GitError::CommandFailed(msg) if msg == "rejected"));
}

#[tokio::test]
async fn tracked_file_reports_commit_and_hash() {
    let fake = FakeGitPort::new();
    let path = Path::new("/proj");
    fake.set_tracked_file(path, "a.txt", "deadbeef", "hash123");
    assert!(fake.is_file_tracked(path, "a.txt").await.unwrap());
    assert_eq!(
        fake.file_last_commit(path, "a.txt").await.unwrap(),
        Some("deadbeef".to_string())
    );
    assert_eq!(
        fake.file_content_hash(path, "a.txt").await.unwrap(),
        Some("hash123".to_string())
    );
    assert!(!fake.is_file_tracked(path, "missing.txt").await.unwrap());
}

#[tokio::test]
async fn worktree_create_and_remove_round_trips() {
    let fake = FakeGitPort::new();
    let project = Path::new("/proj");
    let clone = Path::new("/proj-wt-1");
    fake.create_worktree(project, clone, "section-a", "main")
        .await
        .unwrap();
    assert_eq!(fake.worktrees().len(), 1);

    fake.remove_worktree(project, clone).await.unwrap();
    assert!(fake.worktrees().is_empty());
}
