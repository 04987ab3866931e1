// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parallel Sessions (distilled spec §4.7): split a project into workstreams,
//! each bound to a git branch and a dedicated workspace clone, run
//! concurrently, and auto-merged back in completion order.

use crate::error::EngineError;
use std::path::Path;
use steroids_core::ports::git::{GitPort, MergeOutcome, MergeStrategy};
use steroids_core::{
    IdGen, ParallelSession, ParallelSessionId, Section, SectionId, SessionStatus, Workstream,
    WorkstreamId, WorkstreamStatus,
};
use steroids_storage::{ProjectState, ProjectStore};

/// Partitions sections into up to `n` groups by round-robin over section
/// `position` order, so each workstream gets a roughly even share of work.
pub fn partition_sections(sections: &[Section], n: usize) -> Vec<Vec<SectionId>> {
    let mut ordered: Vec<&Section> = sections.iter().collect();
    ordered.sort_by_key(|s| s.position);

    let n = n.max(1);
    let mut groups = vec![Vec::new(); n];
    for (i, section) in ordered.into_iter().enumerate() {
        groups[i % n].push(section.id.clone());
    }
    groups.into_iter().filter(|g| !g.is_empty()).collect()
}

/// Creates a session and one `Workstream` row (plus git worktree) per group
/// produced by [`partition_sections`], then marks the session `running`.
pub async fn create_session(
    store: &mut ProjectStore,
    git: &impl GitPort,
    id_gen: &impl IdGen,
    project_path: &Path,
    workspace_root: &Path,
    project_path_str: &str,
    base_ref: &str,
    section_groups: Vec<Vec<SectionId>>,
    now_ms: u64,
) -> Result<ParallelSessionId, EngineError> {
    let session_id = ParallelSessionId::new(id_gen.next());
    store.create_parallel_session(ParallelSession {
        id: session_id.clone(),
        project_path: project_path_str.to_string(),
        status: SessionStatus::Planning,
        created_at_ms: now_ms,
        completed_at_ms: None,
    })?;

    for group in section_groups {
        let workstream_id = WorkstreamId::new(id_gen.next());
        let branch_name = format!("steroids/ws-{}", workstream_id.short(8));
        let clone_path = workspace_root.join(format!("ws-{}", workstream_id.short(8)));

        git.create_worktree(project_path, &clone_path, &branch_name, base_ref)
            .await?;

        store.create_workstream(Workstream {
            id: workstream_id,
            session_id: session_id.clone(),
            branch_name,
            section_ids: group,
            clone_path: clone_path.display().to_string(),
            status: WorkstreamStatus::Pending,
            runner_id: None,
            lease_expires_at_ms: None,
            completion_order: None,
            created_at_ms: now_ms,
            completed_at_ms: None,
        })?;
    }

    store.set_session_status(session_id.clone(), SessionStatus::Running, now_ms)?;
    Ok(session_id)
}

/// Result of the whole auto-merge pass (distilled spec §4.7 "Auto-merge
/// protocol"): `(completedCommits, conflicts, skipped, errors[])`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub completed_commits: Vec<String>,
    pub conflicts: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
}

impl MergeReport {
    pub fn final_status(&self) -> SessionStatus {
        if self.errors.is_empty() && self.conflicts == 0 {
            SessionStatus::Completed
        } else {
            SessionStatus::Failed
        }
    }
}

/// Runs the auto-merge protocol over workstreams belonging to `session_id`,
/// iterating completed ones in `completion_order`. `run_validation` is the
/// configured `validationCommand`, if any — `None` skips step 3.
pub async fn auto_merge(
    store: &mut ProjectStore,
    git: &impl GitPort,
    project_path: &Path,
    main_branch: &str,
    session_id: &ParallelSessionId,
    cleanup_on_success: bool,
    run_validation: Option<&dyn Fn() -> bool>,
) -> Result<MergeReport, EngineError> {
    let mut workstreams: Vec<Workstream> = store
        .state()
        .workstreams
        .values()
        .filter(|w| &w.session_id == session_id && w.status == WorkstreamStatus::Completed)
        .cloned()
        .collect();
    workstreams.sort_by_key(|w| w.completion_order.unwrap_or(u32::MAX));

    let mut report = MergeReport::default();

    for workstream in workstreams {
        match git
            .merge(
                project_path,
                &workstream.branch_name,
                main_branch,
                MergeStrategy::FastForwardOrRebase,
            )
            .await
        {
            Ok(MergeOutcome::Conflict) => {
                report.conflicts += 1;
                continue;
            }
            Ok(MergeOutcome::FastForwarded { commit_sha } | MergeOutcome::Rebased { commit_sha }) => {
                if let Some(validate) = run_validation {
                    if !validate() {
                        report.errors.push(format!(
                            "workstream {} failed validation after merge",
                            workstream.id
                        ));
                        continue;
                    }
                }
                report.completed_commits.push(commit_sha);
                if cleanup_on_success {
                    git.remove_worktree(project_path, Path::new(&workstream.clone_path))
                        .await?;
                }
            }
            Err(e) => {
                report.errors.push(e.to_string());
            }
        }
    }

    Ok(report)
}

/// Checks whether every workstream in the session has reached a terminal
/// status — the runner finishing last becomes the merger.
pub fn all_workstreams_terminal(state: &ProjectState, session_id: &ParallelSessionId) -> bool {
    state
        .workstreams
        .values()
        .filter(|w| &w.session_id == session_id)
        .all(|w| {
            matches!(
                w.status,
                WorkstreamStatus::Completed | WorkstreamStatus::Failed | WorkstreamStatus::Aborted
            )
        })
}

/// On session failure/abort: every outstanding lease is revoked so Wakeup's
/// expired-lease sweep doesn't have to wait out the TTL.
pub fn revoke_all_leases(
    store: &mut ProjectStore,
    session_id: &ParallelSessionId,
    now_ms: u64,
) -> Result<(), EngineError> {
    let workstreams: Vec<Workstream> = store
        .state()
        .workstreams
        .values()
        .filter(|w| &w.session_id == session_id)
        .cloned()
        .collect();
    for mut workstream in workstreams {
        workstream.runner_id = None;
        workstream.lease_expires_at_ms = Some(now_ms);
        store.update_workstream(workstream)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "parallel_tests.rs"]
mod tests;
