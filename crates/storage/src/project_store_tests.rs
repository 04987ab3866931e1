// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use steroids_core::{InvocationId, Role, TaskId};
use tempfile::TempDir;

fn sample_task(id: &str) -> Task {
    Task {
        id: TaskId::new(id),
        title: "do the thing".to_string(),
        section_id: None,
        status: TaskStatus::Pending,
        rejection_count: 0,
        source_file: None,
        file_path: None,
        file_line: None,
        file_commit_sha: None,
        file_content_hash: None,
        created_at_ms: 1_000,
        updated_at_ms: 1_000,
    }
}

fn sample_runner(id: &str) -> Runner {
    Runner {
        id: RunnerId::new(id),
        status: RunnerStatus::Idle,
        pid: Some(123),
        project_path: Some("/srv/app".to_string()),
        section_id: None,
        parallel_session_id: None,
        current_task_id: None,
        started_at_ms: 500,
        heartbeat_at_ms: 500,
    }
}

#[test]
fn create_and_reopen_recovers_task_from_wal() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = ProjectStore::open(dir.path()).unwrap();
        store.create_task(sample_task("t1")).unwrap();
    }

    let store = ProjectStore::open(dir.path()).unwrap();
    assert!(store.state().tasks.contains_key(&TaskId::new("t1")));
}

#[test]
fn legal_transition_updates_status_and_appends_audit() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    store.create_task(sample_task("t1")).unwrap();

    let mut task = store.state().tasks[&TaskId::new("t1")].clone();
    task.status = TaskStatus::InProgress;
    store
        .transition_task(task, Actor::Orchestrator, None, None, 2_000)
        .unwrap();

    let stored = &store.state().tasks[&TaskId::new("t1")];
    assert_eq!(stored.status, TaskStatus::InProgress);
    assert_eq!(store.state().audit_log.len(), 1);
    assert_eq!(store.state().audit_log[0].from_status, Some(TaskStatus::Pending));
}

#[test]
fn illegal_transition_is_rejected_before_any_write() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    store.create_task(sample_task("t1")).unwrap();

    let mut task = store.state().tasks[&TaskId::new("t1")].clone();
    task.status = TaskStatus::Completed;
    let err = store
        .transition_task(task, Actor::Orchestrator, None, None, 2_000)
        .unwrap_err();
    assert!(matches!(err, ProjectStoreError::IllegalTransition { .. }));
    assert!(store.state().audit_log.is_empty());
}

#[test]
fn transition_violating_invariants_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    store.create_task(sample_task("t1")).unwrap();

    let mut task = store.state().tasks[&TaskId::new("t1")].clone();
    task.status = TaskStatus::InProgress;
    task.file_line = Some(10);
    let err = store
        .transition_task(task, Actor::Orchestrator, None, None, 2_000)
        .unwrap_err();
    assert!(matches!(err, ProjectStoreError::Invariant(_)));
}

#[test]
fn runner_heartbeat_on_unknown_runner_errors() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    let err = store.heartbeat_runner(RunnerId::new("missing"), 1).unwrap_err();
    assert!(matches!(err, ProjectStoreError::RunnerNotFound(_)));
}

#[test]
fn runner_lifecycle_round_trips_through_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = ProjectStore::open(dir.path()).unwrap();
        store.register_runner(sample_runner("r1")).unwrap();
        store.heartbeat_runner(RunnerId::new("r1"), 999).unwrap();
        store
            .set_runner_status(RunnerId::new("r1"), RunnerStatus::Running)
            .unwrap();
    }

    let store = ProjectStore::open(dir.path()).unwrap();
    let runner = &store.state().runners[&RunnerId::new("r1")];
    assert_eq!(runner.heartbeat_at_ms, 999);
    assert_eq!(runner.status, RunnerStatus::Running);
}

#[test]
fn activity_events_get_monotonic_seq_across_reopen() {
    let dir = TempDir::new().unwrap();
    let seq_before;
    {
        let mut store = ProjectStore::open(dir.path()).unwrap();
        store.create_task(sample_task("t1")).unwrap();
        store
            .append_activity(ActivityEvent {
                project_path: "/srv/app".to_string(),
                runner_id: RunnerId::new("r1"),
                task_id: TaskId::new("t1"),
                task_title: "do the thing".to_string(),
                section_name: None,
                kind: steroids_core::ActivityKind::Completed,
                commit_message: None,
                commit_sha: None,
                at_ms: 3_000,
                seq: 0,
            })
            .unwrap();
        seq_before = store.state().activity_log[0].seq;
    }

    let mut store = ProjectStore::open(dir.path()).unwrap();
    store
        .append_activity(ActivityEvent {
            project_path: "/srv/app".to_string(),
            runner_id: RunnerId::new("r1"),
            task_id: TaskId::new("t1"),
            task_title: "do the thing".to_string(),
            section_name: None,
            kind: steroids_core::ActivityKind::Completed,
            commit_message: None,
            commit_sha: None,
            at_ms: 4_000,
            seq: 0,
        })
        .unwrap();
    let seq_after = store.state().activity_log[1].seq;
    assert!(seq_after > seq_before);
}

#[test]
fn checkpoint_then_reopen_recovers_state_without_wal_replay() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = ProjectStore::open(dir.path()).unwrap();
        store.create_task(sample_task("t1")).unwrap();
        store.checkpoint().unwrap();
    }

    let store = ProjectStore::open(dir.path()).unwrap();
    assert!(store.state().tasks.contains_key(&TaskId::new("t1")));
}

#[test]
fn record_invocation_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = ProjectStore::open(dir.path()).unwrap();
        store.create_task(sample_task("t1")).unwrap();
        store
            .record_invocation(Invocation {
                id: InvocationId::new("inv-1"),
                task_id: TaskId::new("t1"),
                role: Role::Coder,
                provider: "anthropic".to_string(),
                model: "default".to_string(),
                prompt: "do the thing".to_string(),
                response: Some("done".to_string()),
                error: None,
                success: true,
                timed_out: false,
                duration_ms: 1_200,
                rejection_number: None,
                created_at_ms: 1_500,
            })
            .unwrap();
    }

    let store = ProjectStore::open(dir.path()).unwrap();
    assert!(store.state().invocations.contains_key(&InvocationId::new("inv-1")));
}
