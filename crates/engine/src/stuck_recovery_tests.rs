// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use steroids_core::Runner;
use tempfile::TempDir;

fn task(id: &str, status: TaskStatus, rejection_count: u32, updated_at_ms: u64) -> Task {
    Task {
        id: TaskId::new(id),
        title: "t".to_string(),
        section_id: None,
        status,
        rejection_count,
        source_file: None,
        file_path: None,
        file_line: None,
        file_commit_sha: None,
        file_content_hash: None,
        created_at_ms: 0,
        updated_at_ms,
    }
}

fn state_with(tasks: Vec<Task>) -> ProjectState {
    let mut state = ProjectState::default();
    for t in tasks {
        state.tasks.insert(t.id.clone(), t);
    }
    state
}

#[test]
fn flags_stuck_in_progress_task_with_no_active_runner() {
    let state = state_with(vec![task("t1", TaskStatus::InProgress, 0, 1_000)]);
    let actions = find_recoverable(&state, 1_000_000, 60_000, 60_000, |_| false, |_| true);
    assert_eq!(
        actions,
        vec![RecoveryAction::RevertedStuckInProgress {
            task_id: TaskId::new("t1")
        }]
    );
}

#[test]
fn does_not_flag_stuck_in_progress_task_with_an_active_runner() {
    let state = state_with(vec![task("t1", TaskStatus::InProgress, 0, 1_000)]);
    let actions = find_recoverable(&state, 1_000_000, 60_000, 60_000, |_| true, |_| true);
    assert!(actions.is_empty());
}

#[test]
fn flags_stuck_review_task() {
    let state = state_with(vec![task("t1", TaskStatus::Review, 0, 1_000)]);
    let actions = find_recoverable(&state, 1_000_000, 60_000, 60_000, |_| false, |_| true);
    assert_eq!(
        actions,
        vec![RecoveryAction::RevertedStuckReview {
            task_id: TaskId::new("t1")
        }]
    );
}

#[test]
fn flags_task_at_rejection_ceiling_still_non_failed() {
    let state = state_with(vec![task("t1", TaskStatus::InProgress, MAX_REJECTIONS, 999_999)]);
    let actions = find_recoverable(&state, 1_000_000, 60_000, 60_000, |_| true, |_| true);
    assert_eq!(
        actions,
        vec![RecoveryAction::FailedAtRejectionCeiling {
            task_id: TaskId::new("t1")
        }]
    );
}

#[test]
fn apply_recovery_reverts_stuck_in_progress_to_pending() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    store
        .create_task(task("t1", TaskStatus::Pending, 0, 0))
        .unwrap();
    let mut in_progress = store.state().tasks[&TaskId::new("t1")].clone();
    in_progress.status = TaskStatus::InProgress;
    in_progress.updated_at_ms = 1_000;
    store
        .transition_task(in_progress, Actor::Orchestrator, None, None, 1_000)
        .unwrap();

    apply_recovery(
        &mut store,
        &[RecoveryAction::RevertedStuckInProgress {
            task_id: TaskId::new("t1"),
        }],
        5_000,
    )
    .unwrap();

    assert_eq!(store.state().tasks[&TaskId::new("t1")].status, TaskStatus::Pending);
}

#[test]
fn apply_recovery_removes_dead_runner() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    store
        .register_runner(Runner {
            id: steroids_core::RunnerId::new("r1"),
            status: steroids_core::RunnerStatus::Idle,
            pid: Some(1),
            project_path: None,
            section_id: None,
            parallel_session_id: None,
            current_task_id: None,
            started_at_ms: 0,
            heartbeat_at_ms: 0,
        })
        .unwrap();

    apply_recovery(
        &mut store,
        &[RecoveryAction::RemovedDeadRunner {
            runner_id: steroids_core::RunnerId::new("r1"),
        }],
        5_000,
    )
    .unwrap();

    assert!(!store.state().runners.contains_key(&steroids_core::RunnerId::new("r1")));
}
