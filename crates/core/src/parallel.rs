// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parallel sessions and their workstreams.

use crate::runner::RunnerId;
use crate::section::SectionId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a parallel session.
    #[derive(Default)]
    pub struct ParallelSessionId;
}

crate::define_id! {
    /// Unique identifier for a workstream.
    #[derive(Default)]
    pub struct WorkstreamId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Planning,
    Running,
    Completed,
    Failed,
    Aborted,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Aborted
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelSession {
    pub id: ParallelSessionId,
    pub project_path: String,
    pub status: SessionStatus,
    pub created_at_ms: u64,
    pub completed_at_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkstreamStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Aborted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workstream {
    pub id: WorkstreamId,
    pub session_id: ParallelSessionId,
    pub branch_name: String,
    pub section_ids: Vec<SectionId>,
    pub clone_path: String,
    pub status: WorkstreamStatus,
    pub runner_id: Option<RunnerId>,
    pub lease_expires_at_ms: Option<u64>,
    pub completion_order: Option<u32>,
    pub created_at_ms: u64,
    pub completed_at_ms: Option<u64>,
}

impl Workstream {
    /// A workstream's lease is releasable if it is unheld, or held but
    /// expired at or before `now_ms` (distilled spec §8: `lease_expires_at
    /// = now` is releasable, `now + 1ms` is not).
    pub fn lease_is_releasable(&self, now_ms: u64) -> bool {
        match self.lease_expires_at_ms {
            None => true,
            Some(expires_at) => expires_at <= now_ms,
        }
    }

    /// Whether `runner_id` may acquire the lease right now: nobody holds it,
    /// or the current holder's lease is releasable.
    pub fn lease_acquirable(&self, now_ms: u64) -> bool {
        self.runner_id.is_none() || self.lease_is_releasable(now_ms)
    }

    /// A workstream is cleanable once its session is terminal and it is not
    /// itself mid-run (distilled spec §4.8).
    pub fn is_cleanable(&self, session_status: SessionStatus) -> bool {
        session_status.is_terminal() && self.status != WorkstreamStatus::Running
    }
}

#[cfg(test)]
#[path = "parallel_tests.rs"]
mod tests;
