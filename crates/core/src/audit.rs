// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only task audit trail entries.

use crate::task::{TaskId, TaskStatus};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a task audit row.
    #[derive(Default)]
    pub struct TaskAuditId;
}

/// Who performed a transition: the orchestrator loop itself, the coder or
/// reviewer agent, a human via the CLI, or the recovery heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Orchestrator,
    Coder,
    Reviewer,
    Human,
    Recovery,
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Actor::Orchestrator => "orchestrator",
            Actor::Coder => "coder",
            Actor::Reviewer => "reviewer",
            Actor::Human => "human",
            Actor::Recovery => "recovery",
        };
        write!(f, "{s}")
    }
}

/// A single append-only row recording a task's status transition.
///
/// `seq` is a monotonic tie-breaker assigned by the store at append time so
/// rows sharing a millisecond `created_at_ms` still sort deterministically
/// (distilled spec §8: "non-decreasing `created_at`").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAudit {
    pub id: TaskAuditId,
    pub task_id: TaskId,
    pub from_status: Option<TaskStatus>,
    pub to_status: TaskStatus,
    pub actor: Actor,
    pub notes: Option<String>,
    pub commit_sha: Option<String>,
    pub created_at_ms: u64,
    pub seq: u64,
}
