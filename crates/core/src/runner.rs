// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner registration rows and the single-runner-per-project freshness rule.

use crate::parallel::ParallelSessionId;
use crate::section::SectionId;
use crate::task::TaskId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a runner registration.
    #[derive(Default)]
    pub struct RunnerId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerStatus {
    Idle,
    Running,
    Stopping,
}

impl std::fmt::Display for RunnerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunnerStatus::Idle => "idle",
            RunnerStatus::Running => "running",
            RunnerStatus::Stopping => "stopping",
        };
        write!(f, "{s}")
    }
}

/// A registered Runner process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runner {
    pub id: RunnerId,
    pub status: RunnerStatus,
    pub pid: Option<u32>,
    pub project_path: Option<String>,
    pub section_id: Option<SectionId>,
    pub parallel_session_id: Option<ParallelSessionId>,
    pub current_task_id: Option<TaskId>,
    pub started_at_ms: u64,
    pub heartbeat_at_ms: u64,
}

impl Runner {
    /// Whether this runner counts toward the single-runner-per-project
    /// invariant: it must not be attached to a parallel session and its
    /// heartbeat must be within `freshness_window_ms` of `now_ms`.
    pub fn is_active_for_project(&self, now_ms: u64, freshness_window_ms: u64) -> bool {
        self.parallel_session_id.is_none() && self.is_fresh(now_ms, freshness_window_ms)
    }

    /// Whether the heartbeat is within the freshness window. Exactly at the
    /// boundary (`now - heartbeat == window`) counts as fresh (distilled
    /// spec §8 boundary behavior: not stale until `window + 1ms`).
    pub fn is_fresh(&self, now_ms: u64, freshness_window_ms: u64) -> bool {
        now_ms.saturating_sub(self.heartbeat_at_ms) <= freshness_window_ms
    }

    /// Whether this runner is stale and should be reaped by Wakeup.
    pub fn is_stale(&self, now_ms: u64, stale_threshold_ms: u64) -> bool {
        now_ms.saturating_sub(self.heartbeat_at_ms) > stale_threshold_ms
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
