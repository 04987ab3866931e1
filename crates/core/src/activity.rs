// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only activity log consumed by dashboards and stats.

use crate::runner::RunnerId;
use crate::task::TaskId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Completed,
    Failed,
    Disputed,
    Skipped,
    Partial,
}

/// A single terminal task event, globally ordered.
///
/// `seq` is the monotonic tie-breaker assigned by the Global Registry at
/// append time (distilled spec §5: "a consumer sees each completion event
/// at most once per task transition").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub project_path: String,
    pub runner_id: RunnerId,
    pub task_id: TaskId,
    pub task_title: String,
    pub section_name: Option<String>,
    pub kind: ActivityKind,
    pub commit_message: Option<String>,
    pub commit_sha: Option<String>,
    pub at_ms: u64,
    pub seq: u64,
}
