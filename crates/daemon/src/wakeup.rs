// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wakeup Controller (distilled spec §4.4): the short-lived, cron-driven
//! pass that reaps stale runners, releases expired leases, cleans zombie
//! locks, runs stuck-task recovery, and starts new runners where needed.

use std::path::Path;
use std::time::SystemTime;

use steroids_core::ports::process::ProcessControl;
use steroids_core::{ParallelSessionId, RunnerId, SessionStatus, TaskStatus, WorkstreamStatus};
use steroids_engine::{apply_recovery, find_recoverable, RecoveryAction};
use steroids_storage::{ProjectState, ProjectStore, ProjectStoreError};
use thiserror::Error;

use crate::lifecycle::clear_stale_lock_if_dead;

#[derive(Debug, Error)]
pub enum WakeupError {
    #[error(transparent)]
    Store(#[from] ProjectStoreError),
    #[error("failed to spawn runner: {0}")]
    SpawnFailed(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    None,
    Cleaned,
    Started,
    WouldStart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOutcome {
    pub path: String,
    pub action: ProjectAction,
    pub reaped_runners: Vec<RunnerId>,
    pub released_leases: u32,
    pub lock_cleaned: bool,
    pub recovery: Vec<RecoveryAction>,
}

/// Step 1: send SIGTERM to every stale runner's pid, release any lease it
/// held, and delete its row.
pub fn reap_stale_runners(
    store: &mut ProjectStore,
    process: &impl ProcessControl,
    now_ms: u64,
    stale_threshold_ms: u64,
    dry_run: bool,
) -> Result<Vec<RunnerId>, ProjectStoreError> {
    let stale: Vec<_> = store
        .state()
        .runners
        .values()
        .filter(|r| r.is_stale(now_ms, stale_threshold_ms))
        .cloned()
        .collect();

    let mut reaped = Vec::new();
    for runner in stale {
        if dry_run {
            reaped.push(runner.id);
            continue;
        }
        if let Some(pid) = runner.pid {
            let _ = process.kill(pid, steroids_core::ports::process::Signal::Term);
        }
        let held: Vec<_> = store
            .state()
            .workstreams
            .values()
            .filter(|w| w.runner_id.as_ref() == Some(&runner.id))
            .cloned()
            .collect();
        for mut workstream in held {
            workstream.runner_id = None;
            workstream.lease_expires_at_ms = Some(now_ms);
            store.update_workstream(workstream)?;
        }
        store.remove_runner(runner.id.clone())?;
        reaped.push(runner.id);
    }
    Ok(reaped)
}

/// Step 2: release any workstream lease whose TTL has elapsed.
pub fn release_expired_leases(
    store: &mut ProjectStore,
    now_ms: u64,
    dry_run: bool,
) -> Result<u32, ProjectStoreError> {
    let releasable: Vec<_> = store
        .state()
        .workstreams
        .values()
        .filter(|w| {
            w.status == WorkstreamStatus::Running
                && w.runner_id.is_some()
                && w.lease_is_releasable(now_ms)
        })
        .cloned()
        .collect();

    let count = releasable.len() as u32;
    if dry_run {
        return Ok(count);
    }
    for mut workstream in releasable {
        workstream.runner_id = None;
        workstream.lease_expires_at_ms = None;
        store.update_workstream(workstream)?;
    }
    Ok(count)
}

/// Step 3: remove an advisory lock file whose recorded pid is dead.
pub fn clean_zombie_lock(lock_path: &Path, process: &impl ProcessControl, dry_run: bool) -> std::io::Result<bool> {
    if dry_run {
        return Ok(lock_path.exists());
    }
    clear_stale_lock_if_dead(lock_path, process)
}

/// Step 4.a: best-effort removal of per-pid log files older than the
/// configured retention window. Never fatal to the pass.
pub fn clean_log_retention(logs_dir: &Path, now: SystemTime, retention_days: u32) -> u32 {
    let Ok(entries) = std::fs::read_dir(logs_dir) else {
        return 0;
    };
    let max_age = std::time::Duration::from_secs(u64::from(retention_days) * 86_400);
    let mut removed = 0;
    for entry in entries.flatten() {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        if now.duration_since(modified).unwrap_or_default() > max_age
            && std::fs::remove_file(entry.path()).is_ok()
        {
            removed += 1;
        }
    }
    removed
}

/// Step 4.b/4.c: whether this project has work worth waking a runner for.
pub fn has_pending_work(state: &ProjectState) -> bool {
    state.tasks.values().any(|t| {
        matches!(
            t.status,
            TaskStatus::Pending | TaskStatus::InProgress | TaskStatus::Review
        )
    })
}

pub fn has_active_parallel_session(state: &ProjectState) -> bool {
    state
        .parallel_sessions
        .values()
        .any(|s| !s.status.is_terminal())
}

fn active_session_id(state: &ProjectState) -> Option<ParallelSessionId> {
    state
        .parallel_sessions
        .values()
        .find(|s| !s.status.is_terminal())
        .map(|s| s.id.clone())
}

/// Runs steps 4.a-4.f for one project. `spawn` is called only when the
/// decision is to start a runner and `dry_run` is false; it returns the new
/// runner's pid on success.
#[allow(clippy::too_many_arguments)]
pub fn run_project_pass(
    store: &mut ProjectStore,
    project_path: &str,
    now_ms: u64,
    stuck_in_progress_age_ms: u64,
    stuck_review_age_ms: u64,
    dry_run: bool,
    spawn: impl FnOnce() -> std::io::Result<u32>,
) -> Result<ProjectOutcome, WakeupError> {
    if has_active_parallel_session(store.state()) {
        let session_id = active_session_id(store.state());
        tracing::debug!(project_path, session = ?session_id, "skipping: active parallel session");
        return Ok(ProjectOutcome {
            path: project_path.to_string(),
            action: ProjectAction::None,
            reaped_runners: vec![],
            released_leases: 0,
            lock_cleaned: false,
            recovery: vec![],
        });
    }

    if !has_pending_work(store.state()) {
        return Ok(ProjectOutcome {
            path: project_path.to_string(),
            action: ProjectAction::None,
            reaped_runners: vec![],
            released_leases: 0,
            lock_cleaned: false,
            recovery: vec![],
        });
    }

    let recovery_actions = find_recoverable(
        store.state(),
        now_ms,
        stuck_in_progress_age_ms,
        stuck_review_age_ms,
        |task| {
            store
                .state()
                .runners
                .values()
                .any(|r| r.current_task_id.as_ref() == Some(&task.id))
        },
        |runner| runner.pid.is_some(),
    );

    if !dry_run && !recovery_actions.is_empty() {
        apply_recovery(store, &recovery_actions, now_ms)?;
    }

    let already_active = store
        .state()
        .runners
        .values()
        .any(|r| r.is_active_for_project(now_ms, stuck_in_progress_age_ms));
    if already_active {
        return Ok(ProjectOutcome {
            path: project_path.to_string(),
            action: ProjectAction::Cleaned,
            reaped_runners: vec![],
            released_leases: 0,
            lock_cleaned: false,
            recovery: recovery_actions,
        });
    }

    if dry_run {
        return Ok(ProjectOutcome {
            path: project_path.to_string(),
            action: ProjectAction::WouldStart,
            reaped_runners: vec![],
            released_leases: 0,
            lock_cleaned: false,
            recovery: recovery_actions,
        });
    }

    spawn()?;

    Ok(ProjectOutcome {
        path: project_path.to_string(),
        action: ProjectAction::Started,
        reaped_runners: vec![],
        released_leases: 0,
        lock_cleaned: false,
        recovery: recovery_actions,
    })
}

#[cfg(test)]
#[path = "wakeup_tests.rs"]
mod tests;
