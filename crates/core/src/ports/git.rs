// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GitPort`: the minimal git plumbing the core depends on.

use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Fast-forward if possible, rebase otherwise (distilled spec §4.7).
    FastForwardOrRebase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    FastForwarded { commit_sha: String },
    Rebased { commit_sha: String },
    Conflict,
}

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("git command failed: {0}")]
    CommandFailed(String),
    #[error("not a git repository: {0}")]
    NotARepo(String),
}

/// Minimal git plumbing contract (distilled spec §4.11).
#[async_trait]
pub trait GitPort: Send + Sync + 'static {
    async fn is_repo(&self, path: &Path) -> Result<bool, GitError>;
    async fn has_uncommitted_changes(&self, path: &Path) -> Result<bool, GitError>;
    async fn is_file_tracked(&self, path: &Path, file: &str) -> Result<bool, GitError>;
    async fn file_last_commit(&self, path: &Path, file: &str) -> Result<Option<String>, GitError>;
    async fn file_content_hash(&self, path: &Path, file: &str) -> Result<Option<String>, GitError>;
    async fn current_commit_sha(&self, path: &Path) -> Result<String, GitError>;
    async fn push(&self, path: &Path, branch: &str, remote: &str) -> Result<(), GitError>;
    async fn merge(
        &self,
        path: &Path,
        source_branch: &str,
        target_branch: &str,
        strategy: MergeStrategy,
    ) -> Result<MergeOutcome, GitError>;
    /// Create a workstream clone as a git worktree sharing object storage
    /// with the project's primary checkout (SPEC_FULL.md §4 addition).
    async fn create_worktree(
        &self,
        project_path: &Path,
        clone_path: &Path,
        branch_name: &str,
        base_ref: &str,
    ) -> Result<(), GitError>;
    async fn remove_worktree(&self, project_path: &Path, clone_path: &Path) -> Result<(), GitError>;
}
