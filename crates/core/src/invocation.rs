// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only record of an agent invocation (coder/reviewer/coordinator call).

use crate::task::TaskId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an invocation row.
    #[derive(Default)]
    pub struct InvocationId;
}

/// The role an agent was invoked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Coder,
    Reviewer,
    Coordinator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Coder => "coder",
            Role::Reviewer => "reviewer",
            Role::Coordinator => "coordinator",
        };
        write!(f, "{s}")
    }
}

/// An append-only record of one call into `AgentInvoker`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invocation {
    pub id: InvocationId,
    pub task_id: TaskId,
    pub role: Role,
    pub provider: String,
    pub model: String,
    pub prompt: String,
    pub response: Option<String>,
    pub error: Option<String>,
    pub success: bool,
    pub timed_out: bool,
    pub duration_ms: u64,
    pub rejection_number: Option<u32>,
    pub created_at_ms: u64,
}
