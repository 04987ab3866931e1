// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `git`-subprocess-backed `GitPort`.

use crate::subprocess::{run_with_timeout, GIT_TIMEOUT, GIT_WORKTREE_TIMEOUT};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::Path;
use steroids_core::ports::git::{GitError, GitPort, MergeOutcome, MergeStrategy};
use tokio::process::Command;

/// Invokes the system `git` binary. Used by the Runner Daemon and Orchestrator
/// Loop for commit inspection, pushes, merges, and workstream worktrees.
#[derive(Clone, Copy, Default)]
pub struct CliGitPort;

impl CliGitPort {
    pub fn new() -> Self {
        Self
    }

    async fn run(path: &Path, args: &[&str], description: &str) -> Result<String, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(path).args(args);
        let output = run_with_timeout(cmd, GIT_TIMEOUT, description)
            .await
            .map_err(GitError::CommandFailed)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed(format!(
                "{}: {}",
                description,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl GitPort for CliGitPort {
    async fn is_repo(&self, path: &Path) -> Result<bool, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(path).args(["rev-parse", "--is-inside-work-tree"]);
        let output = run_with_timeout(cmd, GIT_TIMEOUT, "git rev-parse")
            .await
            .map_err(GitError::CommandFailed)?;
        Ok(output.status.success())
    }

    async fn has_uncommitted_changes(&self, path: &Path) -> Result<bool, GitError> {
        let status = Self::run(path, &["status", "--porcelain"], "git status").await?;
        Ok(!status.is_empty())
    }

    async fn is_file_tracked(&self, path: &Path, file: &str) -> Result<bool, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(path).args(["ls-files", "--error-unmatch", file]);
        let output = run_with_timeout(cmd, GIT_TIMEOUT, "git ls-files")
            .await
            .map_err(GitError::CommandFailed)?;
        Ok(output.status.success())
    }

    async fn file_last_commit(&self, path: &Path, file: &str) -> Result<Option<String>, GitError> {
        let sha = Self::run(
            path,
            &["log", "-n", "1", "--format=%H", "--", file],
            "git log",
        )
        .await?;
        Ok(if sha.is_empty() { None } else { Some(sha) })
    }

    async fn file_content_hash(&self, path: &Path, file: &str) -> Result<Option<String>, GitError> {
        let full = path.join(file);
        match tokio::fs::read(&full).await {
            Ok(bytes) => {
                let mut hasher = Sha256::new();
                hasher.update(&bytes);
                Ok(Some(format!("{:x}", hasher.finalize())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GitError::CommandFailed(format!("reading {}: {}", file, e))),
        }
    }

    async fn current_commit_sha(&self, path: &Path) -> Result<String, GitError> {
        Self::run(path, &["rev-parse", "HEAD"], "git rev-parse HEAD").await
    }

    async fn push(&self, path: &Path, branch: &str, remote: &str) -> Result<(), GitError> {
        Self::run(path, &["push", remote, branch], "git push").await?;
        Ok(())
    }

    async fn merge(
        &self,
        path: &Path,
        source_branch: &str,
        target_branch: &str,
        strategy: MergeStrategy,
    ) -> Result<MergeOutcome, GitError> {
        let MergeStrategy::FastForwardOrRebase = strategy;

        Self::run(path, &["checkout", target_branch], "git checkout").await?;

        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(path)
            .args(["merge", "--ff-only", source_branch]);
        let ff = run_with_timeout(cmd, GIT_TIMEOUT, "git merge --ff-only")
            .await
            .map_err(GitError::CommandFailed)?;
        if ff.status.success() {
            let sha = Self::run(path, &["rev-parse", "HEAD"], "git rev-parse HEAD").await?;
            return Ok(MergeOutcome::FastForwarded { commit_sha: sha });
        }

        let mut rebase_cmd = Command::new("git");
        rebase_cmd
            .arg("-C")
            .arg(path)
            .args(["rebase", target_branch, source_branch]);
        let rebased = run_with_timeout(rebase_cmd, GIT_TIMEOUT, "git rebase")
            .await
            .map_err(GitError::CommandFailed)?;
        if !rebased.status.success() {
            let mut abort = Command::new("git");
            abort.arg("-C").arg(path).args(["rebase", "--abort"]);
            let _ = run_with_timeout(abort, GIT_TIMEOUT, "git rebase --abort").await;
            return Ok(MergeOutcome::Conflict);
        }

        let mut ff2 = Command::new("git");
        ff2.arg("-C").arg(path).args(["merge", "--ff-only", source_branch]);
        let ff2_out = run_with_timeout(ff2, GIT_TIMEOUT, "git merge --ff-only (post-rebase)")
            .await
            .map_err(GitError::CommandFailed)?;
        if !ff2_out.status.success() {
            return Ok(MergeOutcome::Conflict);
        }
        let sha = Self::run(path, &["rev-parse", "HEAD"], "git rev-parse HEAD").await?;
        Ok(MergeOutcome::Rebased { commit_sha: sha })
    }

    async fn create_worktree(
        &self,
        project_path: &Path,
        clone_path: &Path,
        branch_name: &str,
        base_ref: &str,
    ) -> Result<(), GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(project_path).args([
            "worktree",
            "add",
            "-b",
            branch_name,
            clone_path.to_string_lossy().as_ref(),
            base_ref,
        ]);
        let output = run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree add")
            .await
            .map_err(GitError::CommandFailed)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed(format!(
                "git worktree add: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    async fn remove_worktree(&self, project_path: &Path, clone_path: &Path) -> Result<(), GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(project_path).args([
            "worktree",
            "remove",
            "--force",
            clone_path.to_string_lossy().as_ref(),
        ]);
        let output = run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree remove")
            .await
            .map_err(GitError::CommandFailed)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed(format!(
                "git worktree remove: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
