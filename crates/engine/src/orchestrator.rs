// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator Loop: the per-project coder/reviewer cycle (distilled spec
//! §4.2). One [`Orchestrator`] drives one [`ProjectStore`] until told to
//! stop, the project is disabled, or all work is done.

use crate::credit_pause::{CreditPauseOutcome, PauseResolution};
use crate::error::EngineError;
use crate::selector::{select_batch, select_next, SelectFilter};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use steroids_core::ports::agent_invoker::{AgentInvoker, CreditExhaustion, ReviewerDecision};
use steroids_core::ports::git::GitPort;
use steroids_core::ports::hook::{HookDispatcher, HookEvent};
use steroids_core::{
    Actor, ActivityEvent, ActivityKind, Clock, Config, IdGen, Invocation, InvocationId, Role,
    RunnerId, Task, TaskAction, TaskStatus, MAX_REJECTIONS,
};
use steroids_storage::ProjectStore;

/// What happened in one pass through the loop body, for callers that want to
/// observe progress (tests, the CLI's `steroids loop` foreground mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStep {
    /// No selectable task and nothing in flight: the project is done.
    AllComplete,
    /// Project is disabled; the loop should terminate.
    Disabled,
    /// A coder or reviewer invocation happened for this task (or batch).
    Advanced { task_id: String },
    /// The loop paused for a credit-exhaustion incident (distilled spec §4.9).
    CreditPaused,
}

/// Outcome of a single coder or reviewer phase, before it is folded into a
/// [`LoopStep`] by `step`.
enum PhaseOutcome {
    Advanced,
    CreditPaused,
}

/// Everything the Orchestrator Loop needs beyond the store itself.
pub struct Orchestrator<I, G, H, C, D> {
    pub agent_invoker: I,
    pub git: G,
    pub hooks: H,
    pub clock: C,
    pub id_gen: D,
    pub runner_id: RunnerId,
    pub project_path: PathBuf,
    pub git_remote: String,
    pub git_branch: String,
    pub backoff: Duration,
    /// Path to `steroids.toml`, re-read on every credit-pause poll slice so
    /// an operator's provider/model edit is picked up without a restart.
    pub config_path: PathBuf,
    /// `credit.poll_max_wait_ms` (distilled spec §4.9 step 4).
    pub credit_poll_max_wait_ms: u64,
    /// `sections.batch_mode` (distilled spec §4.1).
    pub batch_mode: bool,
    /// `sections.max_batch_size`.
    pub max_batch_size: usize,
    /// Shared with the process's signal handler: polled by the credit-pause
    /// loop so a shutdown request is honored even while paused.
    pub stop_requested: Arc<AtomicBool>,
}

impl<I, G, H, C, D> Orchestrator<I, G, H, C, D>
where
    I: AgentInvoker,
    G: GitPort,
    H: HookDispatcher,
    C: Clock,
    D: IdGen,
{
    /// Run until `should_stop` returns true, the project is disabled, or all
    /// work completes.
    pub async fn run(
        &self,
        store: &mut ProjectStore,
        is_enabled: impl Fn() -> bool,
        should_stop: impl Fn() -> bool,
    ) -> Result<(), EngineError> {
        loop {
            if should_stop() {
                return Ok(());
            }
            if !is_enabled() {
                return Ok(());
            }
            match self.step(store, &SelectFilter::default()).await? {
                LoopStep::AllComplete => return Ok(()),
                LoopStep::Disabled => return Ok(()),
                LoopStep::Advanced { .. } | LoopStep::CreditPaused => {
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }

    /// One iteration of the loop body (distilled spec §4.1/§4.2 steps 3-5).
    pub async fn step(
        &self,
        store: &mut ProjectStore,
        filter: &SelectFilter,
    ) -> Result<LoopStep, EngineError> {
        if self.batch_mode {
            if let Some((_section, tasks)) = select_batch(store.state(), filter, self.max_batch_size) {
                if !tasks.is_empty() {
                    let task_ids: Vec<String> = tasks.iter().map(|t| t.id.to_string()).collect();
                    return Ok(match self.run_coder_batch_phase(store, &tasks).await? {
                        PhaseOutcome::Advanced => LoopStep::Advanced {
                            task_id: task_ids.join(","),
                        },
                        PhaseOutcome::CreditPaused => LoopStep::CreditPaused,
                    });
                }
            }
        }

        let Some((task, action)) = select_next(store.state(), filter) else {
            return Ok(LoopStep::AllComplete);
        };

        if action == TaskAction::Start {
            let mut started = task.clone();
            started.status = TaskStatus::InProgress;
            started.updated_at_ms = self.clock.epoch_ms();
            store.transition_task(
                started,
                Actor::Orchestrator,
                None,
                None,
                self.clock.epoch_ms(),
            )?;
        }

        let task_id = task.id.clone();
        let outcome = match action {
            TaskAction::Start | TaskAction::Resume => self.run_coder_phase(store, &task, action).await?,
            TaskAction::Review => self.run_reviewer_phase(store, &task).await?,
        };

        Ok(match outcome {
            PhaseOutcome::Advanced => LoopStep::Advanced {
                task_id: task_id.to_string(),
            },
            PhaseOutcome::CreditPaused => LoopStep::CreditPaused,
        })
    }

    async fn run_coder_phase(
        &self,
        store: &mut ProjectStore,
        task: &Task,
        action: TaskAction,
    ) -> Result<PhaseOutcome, EngineError> {
        let result = self
            .agent_invoker
            .invoke_coder(task, &self.project_path, action)
            .await?;

        if let Some(exhaustion) = self.agent_invoker.classify_coder(&result) {
            return self.handle_credit_exhaustion(store, &exhaustion).await;
        }

        store.record_invocation(Invocation {
            id: InvocationId::new(self.id_gen.next()),
            task_id: task.id.clone(),
            role: Role::Coder,
            provider: String::new(),
            model: String::new(),
            prompt: String::new(),
            response: Some(result.stdout.clone()),
            error: if result.stderr.is_empty() {
                None
            } else {
                Some(result.stderr.clone())
            },
            success: result.exit_code == Some(0) && !result.timed_out,
            timed_out: result.timed_out,
            duration_ms: result.duration_ms,
            rejection_number: None,
            created_at_ms: self.clock.epoch_ms(),
        })?;

        self.hooks
            .fire(
                &HookEvent::new("task.updated"),
                serde_json::json!({ "task_id": task.id.to_string(), "action": format!("{action:?}") }),
            )
            .await;

        Ok(PhaseOutcome::Advanced)
    }

    /// Batch variant of the coder phase (distilled spec §4.1 batch mode): all
    /// pending tasks in the selected section are started together and
    /// invoked via `invoke_coder_batch` in one call.
    async fn run_coder_batch_phase(
        &self,
        store: &mut ProjectStore,
        tasks: &[Task],
    ) -> Result<PhaseOutcome, EngineError> {
        let now = self.clock.epoch_ms();
        for task in tasks {
            let mut started = task.clone();
            started.status = TaskStatus::InProgress;
            started.updated_at_ms = now;
            store.transition_task(started, Actor::Orchestrator, None, None, now)?;
        }

        let batch_result = self
            .agent_invoker
            .invoke_coder_batch(tasks, &self.project_path)
            .await?;

        let mut exhaustion = None;
        for (task_id, result) in &batch_result.per_task {
            if let Some(found) = self.agent_invoker.classify_coder(result) {
                exhaustion = Some(found);
                break;
            }

            store.record_invocation(Invocation {
                id: InvocationId::new(self.id_gen.next()),
                task_id: task_id.clone(),
                role: Role::Coder,
                provider: String::new(),
                model: String::new(),
                prompt: String::new(),
                response: Some(result.stdout.clone()),
                error: if result.stderr.is_empty() {
                    None
                } else {
                    Some(result.stderr.clone())
                },
                success: result.exit_code == Some(0) && !result.timed_out,
                timed_out: result.timed_out,
                duration_ms: result.duration_ms,
                rejection_number: None,
                created_at_ms: self.clock.epoch_ms(),
            })?;

            self.hooks
                .fire(
                    &HookEvent::new("task.updated"),
                    serde_json::json!({ "task_id": task_id.to_string(), "action": "batch_start" }),
                )
                .await;

            if result.submitted_for_review {
                if let Some(current) = store.state().tasks.get(task_id).cloned() {
                    if current.status == TaskStatus::InProgress {
                        let mut moved = current;
                        moved.status = TaskStatus::Review;
                        moved.updated_at_ms = self.clock.epoch_ms();
                        store.transition_task(moved, Actor::Coder, None, None, self.clock.epoch_ms())?;
                    }
                }
            }
        }

        match exhaustion {
            Some(exhaustion) => self.handle_credit_exhaustion(store, &exhaustion).await,
            None => Ok(PhaseOutcome::Advanced),
        }
    }

    async fn run_reviewer_phase(
        &self,
        store: &mut ProjectStore,
        task: &Task,
    ) -> Result<PhaseOutcome, EngineError> {
        let result = self
            .agent_invoker
            .invoke_reviewer(task, &self.project_path)
            .await?;

        if let Some(exhaustion) = self.agent_invoker.classify_reviewer(&result) {
            return self.handle_credit_exhaustion(store, &exhaustion).await;
        }

        store.record_invocation(Invocation {
            id: InvocationId::new(self.id_gen.next()),
            task_id: task.id.clone(),
            role: Role::Reviewer,
            provider: String::new(),
            model: String::new(),
            prompt: String::new(),
            response: Some(result.stdout.clone()),
            error: if result.stderr.is_empty() {
                None
            } else {
                Some(result.stderr.clone())
            },
            success: result.exit_code == Some(0) && !result.timed_out,
            timed_out: result.timed_out,
            duration_ms: result.duration_ms,
            rejection_number: Some(task.rejection_count),
            created_at_ms: self.clock.epoch_ms(),
        })?;

        // If the reviewer's own side-channel mutation didn't land, apply the
        // decision here as a fallback (distilled spec §4.2 "Reviewer phase").
        let current_status = store
            .state()
            .tasks
            .get(&task.id)
            .map(|t| t.status)
            .unwrap_or(task.status);

        if !result.store_mutated && current_status == TaskStatus::Review {
            if let Some(decision) = result.decision {
                self.apply_reviewer_decision(store, task, decision, result.notes.clone())?;
            }
        }

        // §4.2 step 5: any terminal status reached here — not only
        // `completed` — gets an activity row and its hook, not just the
        // approve path.
        if let Some(updated) = store.state().tasks.get(&task.id).cloned() {
            match updated.status {
                TaskStatus::Completed => {
                    self.advance_git_and_record(store, task, result.notes.clone()).await?;
                }
                TaskStatus::Failed => {
                    self.record_terminal_outcome(store, task, ActivityKind::Failed, None, None)
                        .await?;
                }
                TaskStatus::Disputed => {
                    self.record_terminal_outcome(store, task, ActivityKind::Disputed, None, None)
                        .await?;
                }
                _ => {}
            }
        }

        Ok(PhaseOutcome::Advanced)
    }

    /// §8 `ignoredAfterFailed`: a reject arriving for a task already `failed`
    /// (e.g. a stale reviewer response racing a rejection-ceiling escalation)
    /// is a no-op for status, but still logs an audit entry.
    fn apply_reviewer_decision(
        &self,
        store: &mut ProjectStore,
        task: &Task,
        decision: ReviewerDecision,
        notes: Option<String>,
    ) -> Result<(), EngineError> {
        let now = self.clock.epoch_ms();

        if task.status == TaskStatus::Failed {
            if decision == ReviewerDecision::Reject {
                store.record_task_note(
                    task.clone(),
                    Actor::Reviewer,
                    Some(notes.unwrap_or_else(|| "ignored_after_failed".to_string())),
                    now,
                )?;
            }
            return Ok(());
        }

        let mut updated = task.clone();
        updated.updated_at_ms = now;
        match decision {
            ReviewerDecision::Approve => {
                updated.status = TaskStatus::Completed;
                store.transition_task(updated, Actor::Reviewer, notes, None, now)?;
            }
            ReviewerDecision::Reject => {
                updated.status = TaskStatus::InProgress;
                updated.rejection_count += 1;
                if updated.rejection_count >= MAX_REJECTIONS {
                    updated.status = TaskStatus::Failed;
                }
                store.transition_task(updated, Actor::Reviewer, notes, None, now)?;
            }
            ReviewerDecision::Dispute => {
                updated.status = TaskStatus::Disputed;
                store.transition_task(updated, Actor::Reviewer, notes, None, now)?;
            }
        }
        Ok(())
    }

    async fn advance_git_and_record(
        &self,
        store: &mut ProjectStore,
        task: &Task,
        commit_message: Option<String>,
    ) -> Result<(), EngineError> {
        self.git
            .push(&self.project_path, &self.git_branch, &self.git_remote)
            .await?;
        let commit_sha = self.git.current_commit_sha(&self.project_path).await?;

        self.record_terminal_outcome(
            store,
            task,
            ActivityKind::Completed,
            commit_message,
            Some(commit_sha),
        )
        .await
    }

    /// Appends the terminal `ActivityEvent`, fires the matching hook, and
    /// checks whether the task's section and/or the whole project just
    /// became fully terminal (distilled spec §6 `section.completed` /
    /// `project.completed`).
    async fn record_terminal_outcome(
        &self,
        store: &mut ProjectStore,
        task: &Task,
        kind: ActivityKind,
        commit_message: Option<String>,
        commit_sha: Option<String>,
    ) -> Result<(), EngineError> {
        store.append_activity(ActivityEvent {
            project_path: self.project_path.display().to_string(),
            runner_id: self.runner_id.clone(),
            task_id: task.id.clone(),
            task_title: task.title.clone(),
            section_name: None,
            kind,
            commit_message,
            commit_sha,
            at_ms: self.clock.epoch_ms(),
            seq: 0,
        })?;

        let event_name = match kind {
            ActivityKind::Completed => "task.completed",
            ActivityKind::Failed => "task.failed",
            ActivityKind::Disputed | ActivityKind::Skipped | ActivityKind::Partial => "task.updated",
        };
        self.hooks
            .fire(
                &HookEvent::new(event_name),
                serde_json::json!({ "task_id": task.id.to_string(), "kind": format!("{kind:?}") }),
            )
            .await;

        self.maybe_fire_section_and_project_completion(store, task).await;
        Ok(())
    }

    /// Every task in the section (or project) has reached a
    /// selection-terminal status: fire the corresponding completion hook.
    /// Fires on every terminal transition that leaves the section/project
    /// fully done, not just once — `HookDispatcher::fire` is documented as
    /// fire-and-forget, so a duplicate delivery is a consumer's concern, not
    /// the loop's.
    async fn maybe_fire_section_and_project_completion(&self, store: &ProjectStore, task: &Task) {
        let state = store.state();

        if let Some(section_id) = &task.section_id {
            let section_done = state
                .tasks
                .values()
                .filter(|t| t.section_id.as_ref() == Some(section_id))
                .all(|t| t.status.is_terminal_for_selection());
            if section_done {
                self.hooks
                    .fire(
                        &HookEvent::new("section.completed"),
                        serde_json::json!({ "section_id": section_id.to_string() }),
                    )
                    .await;
            }
        }

        let project_done = !state.tasks.is_empty()
            && state.tasks.values().all(|t| t.status.is_terminal_for_selection());
        if project_done {
            self.hooks
                .fire(
                    &HookEvent::new("project.completed"),
                    serde_json::json!({ "project_path": self.project_path.display().to_string() }),
                )
                .await;
        }
    }

    /// Distilled spec §4.9: fire `credit.exhausted`, open/confirm the
    /// incident, and — while it stays unresolved — drive the poll-and-wait
    /// protocol instead of falling through to re-invoke the exhausted
    /// provider on the next backoff tick.
    async fn handle_credit_exhaustion(
        &self,
        store: &mut ProjectStore,
        exhaustion: &CreditExhaustion,
    ) -> Result<PhaseOutcome, EngineError> {
        self.hooks
            .fire(
                &HookEvent::new("credit.exhausted"),
                serde_json::json!({
                    "provider": exhaustion.provider,
                    "model": exhaustion.model,
                    "role": exhaustion.role.to_string(),
                    "message": exhaustion.message,
                }),
            )
            .await;

        let outcome = crate::credit_pause::pause_for_credit_exhaustion(
            store,
            &self.clock,
            &self.id_gen,
            exhaustion,
            self.runner_id.clone(),
        )?;

        match outcome {
            CreditPauseOutcome::Resumed => Ok(PhaseOutcome::Advanced),
            CreditPauseOutcome::Paused => {
                let incident_id = store
                    .state()
                    .credit_incidents
                    .values()
                    .find(|incident| {
                        incident.dedup_key()
                            == (
                                exhaustion.provider.as_str(),
                                exhaustion.model.as_str(),
                                exhaustion.role,
                            )
                    })
                    .map(|incident| incident.id.clone())
                    .ok_or_else(|| {
                        EngineError::IntegrityViolation(
                            "credit incident vanished immediately after being opened".to_string(),
                        )
                    })?;

                let config_path = self.config_path.clone();
                let role = exhaustion.role;
                let read_current_role_config = move || {
                    let role_name = match role {
                        Role::Coder => "coder",
                        Role::Reviewer => "reviewer",
                        Role::Coordinator => "coordinator",
                    };
                    Config::load(&config_path).map(|c| c.ai_role(role_name)).unwrap_or_default()
                };
                let stop_requested = Arc::clone(&self.stop_requested);
                let should_stop = move || stop_requested.load(Ordering::Relaxed);

                let resolution = crate::credit_pause::poll_until_resolved(
                    store,
                    &self.clock,
                    &incident_id,
                    self.credit_poll_max_wait_ms,
                    &self.runner_id,
                    should_stop,
                    read_current_role_config,
                    &self.hooks,
                )
                .await?;

                match resolution {
                    PauseResolution::ConfigChanged => Ok(PhaseOutcome::Advanced),
                    PauseResolution::Stopped | PauseResolution::TimedOut => Ok(PhaseOutcome::CreditPaused),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
