// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stuck-Task Recovery heuristics (distilled spec §4.10), run by the Wakeup
//! Controller once per project ahead of deciding whether to spawn a Runner.

use steroids_core::{Actor, Task, TaskId, TaskStatus, MAX_REJECTIONS};
use steroids_storage::{ProjectState, ProjectStore, ProjectStoreError};

/// One recovery action taken (or that would be taken in a dry run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    RevertedStuckInProgress { task_id: TaskId },
    RevertedStuckReview { task_id: TaskId },
    FailedAtRejectionCeiling { task_id: TaskId },
    RemovedDeadRunner { runner_id: steroids_core::RunnerId },
}

/// Finds the tasks/runners a recovery pass would touch, without mutating
/// anything. Used both to preview a `dryRun` pass and to drive the real one.
pub fn find_recoverable(
    state: &ProjectState,
    now_ms: u64,
    stuck_in_progress_age_ms: u64,
    stuck_review_age_ms: u64,
    has_active_runner: impl Fn(&Task) -> bool,
    runner_has_live_pid: impl Fn(&steroids_core::Runner) -> bool,
) -> Vec<RecoveryAction> {
    let mut actions = Vec::new();

    for task in state.tasks.values() {
        if task.status == TaskStatus::InProgress
            && now_ms.saturating_sub(task.updated_at_ms) > stuck_in_progress_age_ms
            && !has_active_runner(task)
        {
            actions.push(RecoveryAction::RevertedStuckInProgress {
                task_id: task.id.clone(),
            });
            continue;
        }
        if task.status == TaskStatus::Review
            && now_ms.saturating_sub(task.updated_at_ms) > stuck_review_age_ms
        {
            actions.push(RecoveryAction::RevertedStuckReview {
                task_id: task.id.clone(),
            });
            continue;
        }
        if task.rejection_count >= MAX_REJECTIONS && task.status != TaskStatus::Failed {
            actions.push(RecoveryAction::FailedAtRejectionCeiling {
                task_id: task.id.clone(),
            });
        }
    }

    for runner in state.runners.values() {
        if !runner_has_live_pid(runner) && !runner.is_fresh(now_ms, stuck_in_progress_age_ms) {
            actions.push(RecoveryAction::RemovedDeadRunner {
                runner_id: runner.id.clone(),
            });
        }
    }

    actions
}

/// Applies the actions found by [`find_recoverable`], rate-limited by the
/// caller (`maxIncidentsPerHour`) before this is even called.
pub fn apply_recovery(
    store: &mut ProjectStore,
    actions: &[RecoveryAction],
    now_ms: u64,
) -> Result<(), ProjectStoreError> {
    for action in actions {
        match action {
            RecoveryAction::RevertedStuckInProgress { task_id } => {
                if let Some(task) = store.state().tasks.get(task_id).cloned() {
                    let mut reverted = task;
                    reverted.status = TaskStatus::Pending;
                    reverted.updated_at_ms = now_ms;
                    store.transition_task(
                        reverted,
                        Actor::Recovery,
                        Some("recovery:stuck_in_progress".to_string()),
                        None,
                        now_ms,
                    )?;
                }
            }
            RecoveryAction::RevertedStuckReview { task_id } => {
                if let Some(task) = store.state().tasks.get(task_id).cloned() {
                    let mut reverted = task;
                    reverted.status = TaskStatus::InProgress;
                    reverted.updated_at_ms = now_ms;
                    store.transition_task(
                        reverted,
                        Actor::Recovery,
                        Some("recovery:stuck_review".to_string()),
                        None,
                        now_ms,
                    )?;
                }
            }
            RecoveryAction::FailedAtRejectionCeiling { task_id } => {
                if let Some(task) = store.state().tasks.get(task_id).cloned() {
                    let mut failed = task;
                    failed.status = TaskStatus::Failed;
                    failed.updated_at_ms = now_ms;
                    store.transition_task(
                        failed,
                        Actor::Recovery,
                        Some("recovery:rejection_ceiling".to_string()),
                        None,
                        now_ms,
                    )?;
                }
            }
            RecoveryAction::RemovedDeadRunner { runner_id } => {
                store.remove_runner(runner_id.clone())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "stuck_recovery_tests.rs"]
mod tests;
