// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn runner(heartbeat_at_ms: u64, parallel: Option<ParallelSessionId>) -> Runner {
    Runner {
        id: RunnerId::new("r1"),
        status: RunnerStatus::Running,
        pid: Some(123),
        project_path: Some("/repo".into()),
        section_id: None,
        parallel_session_id: parallel,
        current_task_id: None,
        started_at_ms: 0,
        heartbeat_at_ms,
    }
}

#[test]
fn fresh_at_exact_boundary_is_not_stale() {
    let r = runner(1_000, None);
    // now - heartbeat == stale_threshold exactly: not stale yet.
    assert!(!r.is_stale(1_000 + 120_000, 120_000));
    assert!(r.is_fresh(1_000 + 120_000, 120_000));
}

#[test]
fn one_ms_past_threshold_is_stale() {
    let r = runner(1_000, None);
    assert!(r.is_stale(1_000 + 120_001, 120_000));
    assert!(!r.is_fresh(1_000 + 120_001, 120_000));
}

#[test]
fn parallel_attached_runner_does_not_count_for_single_runner_invariant() {
    let r = runner(1_000, Some(ParallelSessionId::new("s1")));
    assert!(!r.is_active_for_project(1_000, 300_000));
}

#[test]
fn fresh_non_parallel_runner_is_active() {
    let r = runner(1_000, None);
    assert!(r.is_active_for_project(1_500, 300_000));
}
