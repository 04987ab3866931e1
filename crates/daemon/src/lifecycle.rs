// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner Daemon lifecycle: startup preconditions, registration, heartbeat,
//! the single-runner invariant, and graceful shutdown (distilled spec
//! §4.3).

use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use fs2::FileExt;
use steroids_core::ports::process::ProcessControl;
use steroids_core::{
    IdGen, ParallelSessionId, ProjectStats, Runner, RunnerId, RunnerStatus, Section, SectionId,
    TaskStatus,
};
use steroids_storage::{ProjectState, ProjectStore, ProjectStoreError};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,
    #[error("another runner is already active for this project")]
    AlreadyActive,
    #[error("section {0} is skipped and cannot be focused")]
    FocusOnSkippedSection(SectionId),
    #[error("failed to acquire runner lock: {0}")]
    LockFailed(#[source] std::io::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] ProjectStoreError),
}

/// `canStart(projectPath)` (distilled spec §4.3): true iff no Runner row is
/// active for this project, where "active" excludes parallel-session
/// attachments and requires a fresh heartbeat.
pub fn can_start(state: &ProjectState, now_ms: u64, freshness_window_ms: u64) -> bool {
    !state
        .runners
        .values()
        .any(|r| r.is_active_for_project(now_ms, freshness_window_ms))
}

/// Combines the two startup preconditions (distilled spec §4.3
/// "Startup preconditions" and "Section focus").
pub fn preflight(
    state: &ProjectState,
    now_ms: u64,
    freshness_window_ms: u64,
    focus_sections: &[SectionId],
) -> Result<(), LifecycleError> {
    if !can_start(state, now_ms, freshness_window_ms) {
        return Err(LifecycleError::AlreadyActive);
    }
    validate_section_focus(state, focus_sections)
}

/// Rejects a section focus list that names any `skipped` section.
pub fn validate_section_focus(
    state: &ProjectState,
    section_ids: &[SectionId],
) -> Result<(), LifecycleError> {
    for section in section_with_ids(state, section_ids) {
        if section.skipped {
            return Err(LifecycleError::FocusOnSkippedSection(section.id.clone()));
        }
    }
    Ok(())
}

fn section_with_ids<'a>(
    state: &'a ProjectState,
    section_ids: &'a [SectionId],
) -> impl Iterator<Item = &'a Section> {
    section_ids.iter().filter_map(|id| state.sections.get(id))
}

/// Acquires the advisory filesystem lock backing the single-runner
/// invariant in depth. The Project Store's Runner rows are the authority
/// (SPEC_FULL.md §5); this lock only guards the narrow race between
/// "decided to start" and "registered".
pub fn acquire_lock(lock_path: &Path) -> Result<File, LifecycleError> {
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;
    file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

/// Registers a Runner row (`status=idle`) then immediately flips it to
/// `running`, matching the distilled spec's "registration, then running
/// once the loop starts" sequence.
pub fn register(
    store: &mut ProjectStore,
    id_gen: &impl IdGen,
    process: &impl ProcessControl,
    project_path: &str,
    section_id: Option<SectionId>,
    parallel_session_id: Option<ParallelSessionId>,
    now_ms: u64,
) -> Result<RunnerId, LifecycleError> {
    let runner_id = RunnerId::new(id_gen.next());
    store.register_runner(Runner {
        id: runner_id.clone(),
        status: RunnerStatus::Idle,
        pid: Some(process.self_pid()),
        project_path: Some(project_path.to_string()),
        section_id,
        parallel_session_id,
        current_task_id: None,
        started_at_ms: now_ms,
        heartbeat_at_ms: now_ms,
    })?;
    store.set_runner_status(runner_id.clone(), RunnerStatus::Running)?;
    Ok(runner_id)
}

/// One heartbeat tick (distilled spec §4.3): refresh `heartbeat_at`, then
/// recompute and return project stats for the caller to sync into the
/// Global Registry's `Project` row.
pub fn heartbeat(
    store: &mut ProjectStore,
    runner_id: RunnerId,
    now_ms: u64,
) -> Result<ProjectStats, LifecycleError> {
    store.heartbeat_runner(runner_id, now_ms)?;
    Ok(compute_stats(store.state()))
}

/// Tallies tasks by status bucket for the `Project.stats` cache
/// (SPEC_FULL.md §3 addition — never authoritative, always recomputable).
pub fn compute_stats(state: &ProjectState) -> ProjectStats {
    let mut stats = ProjectStats::default();
    for task in state.tasks.values() {
        match task.status {
            TaskStatus::Pending => stats.pending += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
            TaskStatus::Review => stats.review += 1,
            TaskStatus::Completed => stats.completed += 1,
            _ => {}
        }
    }
    stats
}

/// Re-checks the single-runner invariant at heartbeat time: a runner that
/// sees another active row for the same project with an earlier
/// `started_at` must exit (distilled spec §4.3).
pub fn detect_superseded(
    state: &ProjectState,
    self_id: &RunnerId,
    now_ms: u64,
    freshness_window_ms: u64,
) -> bool {
    let Some(me) = state.runners.get(self_id) else {
        return false;
    };
    state.runners.values().any(|other| {
        other.id != *self_id
            && other.is_active_for_project(now_ms, freshness_window_ms)
            && other.started_at_ms < me.started_at_ms
    })
}

/// Graceful shutdown (distilled spec §4.3): stop heartbeat (the caller's
/// responsibility), release any held workstream lease, delete the Runner
/// row, exit 0. Idempotent — a missing runner row is not an error.
pub fn shutdown(store: &mut ProjectStore, runner_id: RunnerId, now_ms: u64) -> Result<(), LifecycleError> {
    if !store.state().runners.contains_key(&runner_id) {
        return Ok(());
    }
    let held: Vec<_> = store
        .state()
        .workstreams
        .values()
        .filter(|w| w.runner_id.as_ref() == Some(&runner_id))
        .cloned()
        .collect();
    for mut workstream in held {
        workstream.runner_id = None;
        workstream.lease_expires_at_ms = Some(now_ms);
        store.update_workstream(workstream)?;
    }
    store.set_runner_status(runner_id.clone(), RunnerStatus::Stopping)?;
    store.remove_runner(runner_id)?;
    Ok(())
}

/// Removes the advisory lock file if its recorded pid is dead, so a crash
/// without clean shutdown doesn't permanently block the next runner
/// (done proactively here, and defensively again by Wakeup step 3).
pub fn clear_stale_lock_if_dead(lock_path: &Path, process: &impl ProcessControl) -> std::io::Result<bool> {
    if !lock_path.exists() {
        return Ok(false);
    }
    let contents = std::fs::read_to_string(lock_path)?;
    let Ok(pid) = contents.trim().parse::<u32>() else {
        return Ok(false);
    };
    if process.is_alive(pid) {
        return Ok(false);
    }
    std::fs::remove_file(lock_path)?;
    warn!(pid, path = %lock_path.display(), "removed zombie runner lock");
    Ok(true)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
