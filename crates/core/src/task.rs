// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identifier, status, and the legal-transition table.

use crate::section::SectionId;
use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Unique identifier for a task.
    #[derive(Default)]
    pub struct TaskId;
}

/// Maximum number of rejections before a task is forced to `failed`.
pub const MAX_REJECTIONS: u32 = 15;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Review,
    Completed,
    Disputed,
    Failed,
    Skipped,
    Partial,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Completed => "completed",
            TaskStatus::Disputed => "disputed",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Partial => "partial",
        };
        write!(f, "{s}")
    }
}

impl TaskStatus {
    /// Status bucket used by the Task Selector's priority ordering:
    /// `review` > `in_progress` > `pending`. Returns `None` for statuses
    /// that are never selectable.
    pub fn selection_bucket(self) -> Option<u8> {
        match self {
            TaskStatus::Review => Some(0),
            TaskStatus::InProgress => Some(1),
            TaskStatus::Pending => Some(2),
            _ => None,
        }
    }

    pub fn is_terminal_for_selection(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed
                | TaskStatus::Failed
                | TaskStatus::Skipped
                | TaskStatus::Partial
                | TaskStatus::Disputed
        )
    }
}

/// Action the Orchestrator Loop takes for a selected task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    Start,
    Resume,
    Review,
}

impl TaskAction {
    /// The action mapping from the distilled spec: `pending -> start`,
    /// `in_progress -> resume`, `review -> review`.
    pub fn for_status(status: TaskStatus) -> Option<Self> {
        match status {
            TaskStatus::Pending => Some(TaskAction::Start),
            TaskStatus::InProgress => Some(TaskAction::Resume),
            TaskStatus::Review => Some(TaskAction::Review),
            _ => None,
        }
    }
}

/// Returns whether `to` is a legal direct successor of `from` per the
/// orchestrator's transition table (distilled spec §4.2).
pub fn is_legal_transition(from: TaskStatus, to: TaskStatus) -> bool {
    use TaskStatus::*;
    match from {
        Pending => matches!(to, InProgress | Skipped | Partial),
        InProgress => matches!(to, Review | InProgress | Failed | Disputed | Skipped | Partial),
        Review => matches!(to, Completed | InProgress | Disputed | Failed),
        Completed => false,
        Skipped => matches!(to, Pending),
        Partial => matches!(to, Pending),
        Failed => matches!(to, Pending),
        Disputed => matches!(to, InProgress | Completed),
    }
}

/// A unit of work tracked by the Project Store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub section_id: Option<SectionId>,
    pub status: TaskStatus,
    pub rejection_count: u32,
    pub source_file: Option<String>,
    pub file_path: Option<String>,
    pub file_line: Option<u32>,
    pub file_commit_sha: Option<String>,
    pub file_content_hash: Option<String>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

/// Why a `Task` failed data-model validation (distilled spec §3.1 invariants).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskInvariantError {
    #[error("rejection_count {0} exceeds the maximum of {MAX_REJECTIONS}")]
    RejectionCountTooHigh(u32),
    #[error("status is failed but rejection_count {0} is below {MAX_REJECTIONS}")]
    FailedBelowRejectionCeiling(u32),
    #[error("file_line is set but file_path is not")]
    FileLineWithoutPath,
    #[error("file_path is set but file_commit_sha is not")]
    FilePathWithoutCommitSha,
    #[error("file_path is set but file_content_hash is not")]
    FilePathWithoutContentHash,
}

impl Task {
    /// Validate the invariants in distilled spec §3.1. Called by the store
    /// before every write so a bad mutation never reaches the materialized
    /// state or the WAL.
    pub fn check_invariants(&self) -> Result<(), TaskInvariantError> {
        if self.rejection_count > MAX_REJECTIONS {
            return Err(TaskInvariantError::RejectionCountTooHigh(
                self.rejection_count,
            ));
        }
        if self.status == TaskStatus::Failed && self.rejection_count < MAX_REJECTIONS {
            return Err(TaskInvariantError::FailedBelowRejectionCeiling(
                self.rejection_count,
            ));
        }
        if self.file_line.is_some() && self.file_path.is_none() {
            return Err(TaskInvariantError::FileLineWithoutPath);
        }
        if self.file_path.is_some() {
            if self.file_commit_sha.is_none() {
                return Err(TaskInvariantError::FilePathWithoutCommitSha);
            }
            if self.file_content_hash.is_none() {
                return Err(TaskInvariantError::FilePathWithoutContentHash);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
