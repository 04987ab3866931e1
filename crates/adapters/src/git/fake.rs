// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake `GitPort` for deterministic testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use steroids_core::ports::git::{GitError, GitPort, MergeOutcome, MergeStrategy};

#[derive(Debug, Default)]
struct FakeGitState {
    repos: HashMap<PathBuf, bool>,
    dirty: HashMap<PathBuf, bool>,
    tracked_files: HashMap<(PathBuf, String), (String, String)>,
    head: HashMap<PathBuf, String>,
    push_error: Option<String>,
    merge_outcome: Option<MergeOutcome>,
    pushes: Vec<(PathBuf, String, String)>,
    worktrees: HashMap<PathBuf, (PathBuf, String)>,
}

/// In-memory `GitPort` fake. Paths are never touched on disk; state is
/// entirely programmed via the setter methods.
#[derive(Clone, Default)]
pub struct FakeGitPort {
    inner: Arc<Mutex<FakeGitState>>,
}

impl FakeGitPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_repo(&self, path: &Path, is_repo: bool) {
        self.inner.lock().repos.insert(path.to_path_buf(), is_repo);
    }

    pub fn set_dirty(&self, path: &Path, dirty: bool) {
        self.inner.lock().dirty.insert(path.to_path_buf(), dirty);
    }

    pub fn set_tracked_file(&self, path: &Path, file: &str, commit_sha: &str, content_hash: &str) {
        self.inner.lock().tracked_files.insert(
            (path.to_path_buf(), file.to_string()),
            (commit_sha.to_string(), content_hash.to_string()),
        );
    }

    pub fn set_head(&self, path: &Path, sha: &str) {
        self.inner.lock().head.insert(path.to_path_buf(), sha.to_string());
    }

    pub fn set_push_error(&self, message: &str) {
        self.inner.lock().push_error = Some(message.to_string());
    }

    pub fn set_merge_outcome(&self, outcome: MergeOutcome) {
        self.inner.lock().merge_outcome = Some(outcome);
    }

    pub fn pushes(&self) -> Vec<(PathBuf, String, String)> {
        self.inner.lock().pushes.clone()
    }

    pub fn worktrees(&self) -> HashMap<PathBuf, (PathBuf, String)> {
        self.inner.lock().worktrees.clone()
    }
}

#[async_trait]
impl GitPort for FakeGitPort {
    async fn is_repo(&self, path: &Path) -> Result<bool, GitError> {
        Ok(*self.inner.lock().repos.get(path).unwrap_or(&true))
    }

    async fn has_uncommitted_changes(&self, path: &Path) -> Result<bool, GitError> {
        Ok(*self.inner.lock().dirty.get(path).unwrap_or(&false))
    }

    async fn is_file_tracked(&self, path: &Path, file: &str) -> Result<bool, GitError> {
        Ok(self
            .inner
            .lock()
            .tracked_files
            .contains_key(&(path.to_path_buf(), file.to_string())))
    }

    async fn file_last_commit(&self, path: &Path, file: &str) -> Result<Option<String>, GitError> {
        Ok(self
            .inner
            .lock()
            .tracked_files
            .get(&(path.to_path_buf(), file.to_string()))
            .map(|(sha, _)| sha.clone()))
    }

    async fn file_content_hash(&self, path: &Path, file: &str) -> Result<Option<String>, GitError> {
        Ok(self
            .inner
            .lock()
            .tracked_files
            .get(&(path.to_path_buf(), file.to_string()))
            .map(|(_, hash)| hash.clone()))
    }

    async fn current_commit_sha(&self, path: &Path) -> Result<String, GitError> {
        Ok(self
            .inner
            .lock()
            .head
            .get(path)
            .cloned()
            .unwrap_or_else(|| "0".repeat(40)))
    }

    async fn push(&self, path: &Path, branch: &str, remote: &str) -> Result<(), GitError> {
        let mut inner = self.inner.lock();
        if let Some(message) = inner.push_error.take() {
            return Err(GitError::CommandFailed(message));
        }
        inner
            .pushes
            .push((path.to_path_buf(), branch.to_string(), remote.to_string()));
        Ok(())
    }

    async fn merge(
        &self,
        _path: &Path,
        _source_branch: &str,
        _target_branch: &str,
        _strategy: MergeStrategy,
    ) -> Result<MergeOutcome, GitError> {
        Ok(self
            .inner
            .lock()
            .merge_outcome
            .clone()
            .unwrap_or(MergeOutcome::FastForwarded {
                commit_sha: "f".repeat(40),
            }))
    }

    async fn create_worktree(
        &self,
        _project_path: &Path,
        clone_path: &Path,
        branch_name: &str,
        _base_ref: &str,
    ) -> Result<(), GitError> {
        self.inner
            .lock()
            .worktrees
            .insert(clone_path.to_path_buf(), (clone_path.to_path_buf(), branch_name.to_string()));
        Ok(())
    }

    async fn remove_worktree(&self, _project_path: &Path, clone_path: &Path) -> Result<(), GitError> {
        self.inner.lock().worktrees.remove(clone_path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
