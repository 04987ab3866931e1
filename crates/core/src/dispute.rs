// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Disputes raised by the coder or reviewer agent over a task's outcome.

use crate::task::TaskId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a dispute.
    #[derive(Default)]
    pub struct DisputeId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeType {
    Major,
    Minor,
    Coder,
    Reviewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub task_id: TaskId,
    pub dispute_type: DisputeType,
    pub reason: String,
    pub status: DisputeStatus,
    pub coder_position: Option<String>,
    pub reviewer_position: Option<String>,
    pub resolution: Option<String>,
    pub resolution_notes: Option<String>,
    pub created_by: String,
    pub created_at_ms: u64,
    pub resolved_by: Option<String>,
    pub resolved_at_ms: Option<u64>,
}

impl Dispute {
    pub fn is_open(&self) -> bool {
        self.status == DisputeStatus::Open
    }
}
