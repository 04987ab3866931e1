// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake `AgentInvoker` for deterministic testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use steroids_core::ports::agent_invoker::{
    AgentInvoker, AgentInvokerError, BatchCoderResult, CoderResult, CreditExhaustion, ReviewerResult,
};
use steroids_core::task::{Task, TaskAction};

#[derive(Debug, Clone)]
pub enum AgentCall {
    Coder { task_id: String, action: TaskAction },
    Reviewer { task_id: String },
    Batch { task_ids: Vec<String> },
}

#[derive(Default)]
struct FakeAgentState {
    coder_results: VecDeque<CoderResult>,
    reviewer_results: VecDeque<ReviewerResult>,
    calls: Vec<AgentCall>,
    coder_exhaustion: Option<CreditExhaustion>,
    reviewer_exhaustion: Option<CreditExhaustion>,
}

/// Queues canned results; returns a default `CoderResult`/`ReviewerResult`
/// once the queue is drained.
#[derive(Clone, Default)]
pub struct FakeAgentInvoker {
    inner: Arc<Mutex<FakeAgentState>>,
}

impl FakeAgentInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_coder_result(&self, result: CoderResult) {
        self.inner.lock().coder_results.push_back(result);
    }

    pub fn push_reviewer_result(&self, result: ReviewerResult) {
        self.inner.lock().reviewer_results.push_back(result);
    }

    pub fn set_coder_exhaustion(&self, exhaustion: CreditExhaustion) {
        self.inner.lock().coder_exhaustion = Some(exhaustion);
    }

    pub fn set_reviewer_exhaustion(&self, exhaustion: CreditExhaustion) {
        self.inner.lock().reviewer_exhaustion = Some(exhaustion);
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl AgentInvoker for FakeAgentInvoker {
    async fn invoke_coder(
        &self,
        task: &Task,
        _project_path: &Path,
        action: TaskAction,
    ) -> Result<CoderResult, AgentInvokerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(AgentCall::Coder {
            task_id: task.id.to_string(),
            action,
        });
        Ok(inner.coder_results.pop_front().unwrap_or_default())
    }

    async fn invoke_reviewer(
        &self,
        task: &Task,
        _project_path: &Path,
    ) -> Result<ReviewerResult, AgentInvokerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(AgentCall::Reviewer {
            task_id: task.id.to_string(),
        });
        Ok(inner.reviewer_results.pop_front().unwrap_or_default())
    }

    async fn invoke_coder_batch(
        &self,
        tasks: &[Task],
        _project_path: &Path,
    ) -> Result<BatchCoderResult, AgentInvokerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(AgentCall::Batch {
            task_ids: tasks.iter().map(|t| t.id.to_string()).collect(),
        });
        let per_task = tasks
            .iter()
            .map(|t| (t.id.clone(), inner.coder_results.pop_front().unwrap_or_default()))
            .collect();
        Ok(BatchCoderResult { per_task })
    }

    fn classify_coder(&self, _result: &CoderResult) -> Option<CreditExhaustion> {
        self.inner.lock().coder_exhaustion.clone()
    }

    fn classify_reviewer(&self, _result: &ReviewerResult) -> Option<CreditExhaustion> {
        self.inner.lock().reviewer_exhaustion.clone()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
