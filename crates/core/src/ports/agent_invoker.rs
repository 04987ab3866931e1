// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AgentInvoker`: the contract to the Coder/Reviewer agent processes.

use crate::invocation::Role;
use crate::task::{Task, TaskAction};
use async_trait::async_trait;
use std::path::Path;

/// A credit-exhaustion classification surfaced by `AgentInvoker::classify`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditExhaustion {
    pub provider: String,
    pub model: String,
    pub role: Role,
    pub message: String,
}

/// The reviewer's decision, when one could be determined from the agent's
/// output even if the store-side mutation did not land (distilled spec
/// §4.2 "fallback" handling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewerDecision {
    Approve,
    Reject,
    Dispute,
}

/// Outcome of one `invoke_coder` call.
#[derive(Debug, Clone, Default)]
pub struct CoderResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    pub timed_out: bool,
    /// True when the agent itself transitioned the task to `review`.
    pub submitted_for_review: bool,
    pub notes: Option<String>,
}

/// Outcome of one `invoke_reviewer` call.
#[derive(Debug, Clone, Default)]
pub struct ReviewerResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    pub timed_out: bool,
    /// Whether the reviewer itself performed the store mutation already.
    pub store_mutated: bool,
    pub decision: Option<ReviewerDecision>,
    pub notes: Option<String>,
}

/// Outcome of a batch coder/reviewer call (distilled spec §4.1 batch mode).
#[derive(Debug, Clone, Default)]
pub struct BatchCoderResult {
    pub per_task: Vec<(crate::task::TaskId, CoderResult)>,
}

/// Errors an `AgentInvoker` call can surface directly (network/spawn
/// failures get wrapped as `Transient` by the caller per distilled spec §7).
#[derive(Debug, thiserror::Error)]
pub enum AgentInvokerError {
    #[error("failed to spawn agent process: {0}")]
    SpawnFailed(String),
    #[error("agent process exited abnormally: {0}")]
    ProcessError(String),
}

/// Contract to the Coder/Reviewer agent processes.
#[async_trait]
pub trait AgentInvoker: Send + Sync + 'static {
    async fn invoke_coder(
        &self,
        task: &Task,
        project_path: &Path,
        action: TaskAction,
    ) -> Result<CoderResult, AgentInvokerError>;

    async fn invoke_reviewer(
        &self,
        task: &Task,
        project_path: &Path,
    ) -> Result<ReviewerResult, AgentInvokerError>;

    async fn invoke_coder_batch(
        &self,
        tasks: &[Task],
        project_path: &Path,
    ) -> Result<BatchCoderResult, AgentInvokerError>;

    /// Classify a failed/erroring result as credit exhaustion, if it is one.
    fn classify_coder(&self, result: &CoderResult) -> Option<CreditExhaustion>;
    fn classify_reviewer(&self, result: &ReviewerResult) -> Option<CreditExhaustion>;
}
