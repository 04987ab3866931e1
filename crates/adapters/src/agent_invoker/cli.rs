// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed `AgentInvoker`: spawns the provider's CLI binary for
//! the Coder and Reviewer roles and classifies credit exhaustion from its
//! output.

use async_trait::async_trait;
use std::path::Path;
use std::time::{Duration, Instant};
use steroids_core::config::AiRoleConfig;
use steroids_core::invocation::Role;
use steroids_core::ports::agent_invoker::{
    AgentInvoker, AgentInvokerError, BatchCoderResult, CoderResult, CreditExhaustion,
    ReviewerDecision, ReviewerResult,
};
use steroids_core::task::{Task, TaskAction};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Substrings that mark a provider response as credit/quota exhaustion
/// rather than an ordinary failure. Matched case-insensitively against
/// combined stdout+stderr.
const EXHAUSTION_MARKERS: &[&str] = &[
    "usage limit",
    "quota exceeded",
    "rate limit exceeded",
    "credit balance",
    "insufficient credits",
];

const SUBMITTED_MARKER: &str = "STEROIDS_SUBMITTED_FOR_REVIEW";
const APPROVE_MARKER: &str = "STEROIDS_DECISION_APPROVE";
const REJECT_MARKER: &str = "STEROIDS_DECISION_REJECT";
const DISPUTE_MARKER: &str = "STEROIDS_DECISION_DISPUTE";

/// Invokes a configured CLI binary as a subprocess, one process per
/// invocation. The prompt is written to stdin; the binary is expected to
/// print its result to stdout and signal task-level outcomes via marker
/// lines (`STEROIDS_SUBMITTED_FOR_REVIEW`, `STEROIDS_DECISION_*`).
#[derive(Clone)]
pub struct CliAgentInvoker {
    command: String,
    coder: AiRoleConfig,
    reviewer: AiRoleConfig,
    timeout: Duration,
}

impl CliAgentInvoker {
    pub fn new(command: String, coder: AiRoleConfig, reviewer: AiRoleConfig, timeout: Duration) -> Self {
        Self {
            command,
            coder,
            reviewer,
            timeout,
        }
    }

    fn action_verb(action: TaskAction) -> &'static str {
        match action {
            TaskAction::Start => "start",
            TaskAction::Resume => "resume",
            TaskAction::Review => "review",
        }
    }

    async fn run(
        &self,
        role: &str,
        model: &str,
        action: Option<&str>,
        prompt: &str,
        cwd: &Path,
    ) -> (String, String, Option<i32>, u64, bool) {
        let start = Instant::now();
        let mut cmd = Command::new(&self.command);
        cmd.arg("--role").arg(role).arg("--model").arg(model);
        if let Some(action) = action {
            cmd.arg("--action").arg(action);
        }
        cmd.current_dir(cwd);
        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return (String::new(), e.to_string(), None, 0, false),
        };
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(prompt.as_bytes()).await;
        }

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => (
                String::from_utf8_lossy(&output.stdout).to_string(),
                String::from_utf8_lossy(&output.stderr).to_string(),
                output.status.code(),
                start.elapsed().as_millis() as u64,
                false,
            ),
            Ok(Err(e)) => (
                String::new(),
                e.to_string(),
                None,
                start.elapsed().as_millis() as u64,
                false,
            ),
            Err(_elapsed) => (
                String::new(),
                format!("{} timed out after {}s", role, self.timeout.as_secs()),
                None,
                start.elapsed().as_millis() as u64,
                true,
            ),
        }
    }

    fn classify(provider: &str, model: &str, role: Role, stdout: &str, stderr: &str) -> Option<CreditExhaustion> {
        let combined = format!("{}\n{}", stdout, stderr).to_lowercase();
        EXHAUSTION_MARKERS
            .iter()
            .find(|marker| combined.contains(*marker))
            .map(|marker| CreditExhaustion {
                provider: provider.to_string(),
                model: model.to_string(),
                role,
                message: format!("matched exhaustion marker: {}", marker),
            })
    }
}

#[async_trait]
impl AgentInvoker for CliAgentInvoker {
    async fn invoke_coder(
        &self,
        task: &Task,
        project_path: &Path,
        action: TaskAction,
    ) -> Result<CoderResult, AgentInvokerError> {
        let prompt = format!("task: {}\ntitle: {}", task.id, task.title);
        let (stdout, stderr, exit_code, duration_ms, timed_out) = self
            .run(
                "coder",
                &self.coder.model,
                Some(Self::action_verb(action)),
                &prompt,
                project_path,
            )
            .await;

        Ok(CoderResult {
            submitted_for_review: stdout.contains(SUBMITTED_MARKER),
            notes: None,
            stdout,
            stderr,
            exit_code,
            duration_ms,
            timed_out,
        })
    }

    async fn invoke_reviewer(
        &self,
        task: &Task,
        project_path: &Path,
    ) -> Result<ReviewerResult, AgentInvokerError> {
        let prompt = format!("task: {}\ntitle: {}", task.id, task.title);
        let (stdout, stderr, exit_code, duration_ms, timed_out) = self
            .run("reviewer", &self.reviewer.model, None, &prompt, project_path)
            .await;

        let decision = if stdout.contains(APPROVE_MARKER) {
            Some(ReviewerDecision::Approve)
        } else if stdout.contains(REJECT_MARKER) {
            Some(ReviewerDecision::Reject)
        } else if stdout.contains(DISPUTE_MARKER) {
            Some(ReviewerDecision::Dispute)
        } else {
            None
        };

        Ok(ReviewerResult {
            store_mutated: false,
            decision,
            notes: None,
            stdout,
            stderr,
            exit_code,
            duration_ms,
            timed_out,
        })
    }

    async fn invoke_coder_batch(
        &self,
        tasks: &[Task],
        project_path: &Path,
    ) -> Result<BatchCoderResult, AgentInvokerError> {
        let mut per_task = Vec::with_capacity(tasks.len());
        for task in tasks {
            let result = self.invoke_coder(task, project_path, TaskAction::Start).await?;
            per_task.push((task.id.clone(), result));
        }
        Ok(BatchCoderResult { per_task })
    }

    fn classify_coder(&self, result: &CoderResult) -> Option<CreditExhaustion> {
        Self::classify(&self.coder.provider, &self.coder.model, Role::Coder, &result.stdout, &result.stderr)
    }

    fn classify_reviewer(&self, result: &ReviewerResult) -> Option<CreditExhaustion> {
        Self::classify(
            &self.reviewer.provider,
            &self.reviewer.model,
            Role::Reviewer,
            &result.stdout,
            &result.stderr,
        )
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
