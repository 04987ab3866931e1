// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use steroids_adapters::FakeGitPort;
use steroids_core::SequentialIdGen;
use tempfile::TempDir;

fn section(id: &str, position: i64) -> Section {
    Section {
        id: SectionId::new(id),
        name: id.to_string(),
        position,
        priority: 0,
        skipped: false,
        depends_on: vec![],
    }
}

#[test]
fn partition_sections_round_robins_by_position() {
    let sections = vec![section("a", 0), section("b", 1), section("c", 2), section("d", 3)];
    let groups = partition_sections(&sections, 2);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0], vec![SectionId::new("a"), SectionId::new("c")]);
    assert_eq!(groups[1], vec![SectionId::new("b"), SectionId::new("d")]);
}

#[test]
fn partition_sections_drops_empty_groups_when_fewer_sections_than_n() {
    let sections = vec![section("a", 0)];
    let groups = partition_sections(&sections, 4);
    assert_eq!(groups.len(), 1);
}

#[tokio::test]
async fn create_session_materializes_one_workstream_per_group_and_sets_running() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    let git = FakeGitPort::new();
    let id_gen = SequentialIdGen::new("ps");
    let workspace_root = std::path::PathBuf::from("/srv/workspaces/proj");

    let session_id = create_session(
        &mut store,
        &git,
        &id_gen,
        Path::new("/srv/app"),
        &workspace_root,
        "/srv/app",
        "main",
        vec![vec![SectionId::new("s1")], vec![SectionId::new("s2")]],
        1_000,
    )
    .await
    .unwrap();

    assert_eq!(
        store.state().parallel_sessions[&session_id].status,
        SessionStatus::Running
    );
    assert_eq!(store.state().workstreams.len(), 2);
    assert_eq!(git.worktrees().len(), 2);
}

#[tokio::test]
async fn auto_merge_counts_conflicts_and_records_commits_in_completion_order() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    let session_id = ParallelSessionId::new("sess-1");
    store
        .create_parallel_session(ParallelSession {
            id: session_id.clone(),
            project_path: "/srv/app".to_string(),
            status: SessionStatus::Running,
            created_at_ms: 0,
            completed_at_ms: None,
        })
        .unwrap();
    store
        .create_workstream(Workstream {
            id: WorkstreamId::new("ws1"),
            session_id: session_id.clone(),
            branch_name: "steroids/ws-1".to_string(),
            section_ids: vec![SectionId::new("s1")],
            clone_path: "/srv/workspaces/ws1".to_string(),
            status: WorkstreamStatus::Completed,
            runner_id: None,
            lease_expires_at_ms: None,
            completion_order: Some(0),
            created_at_ms: 0,
            completed_at_ms: Some(1_000),
        })
        .unwrap();

    let git = FakeGitPort::new();
    git.set_merge_outcome(MergeOutcome::FastForwarded {
        commit_sha: "abc123".to_string(),
    });

    let report = auto_merge(
        &mut store,
        &git,
        Path::new("/srv/app"),
        "main",
        &session_id,
        false,
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.completed_commits, vec!["abc123".to_string()]);
    assert_eq!(report.conflicts, 0);
    assert_eq!(report.final_status(), SessionStatus::Completed);
}

#[test]
fn all_workstreams_terminal_is_false_while_one_is_still_running() {
    let mut state = ProjectState::default();
    let session_id = ParallelSessionId::new("sess-1");
    state.workstreams.insert(
        WorkstreamId::new("ws1"),
        Workstream {
            id: WorkstreamId::new("ws1"),
            session_id: session_id.clone(),
            branch_name: "b".to_string(),
            section_ids: vec![],
            clone_path: "/x".to_string(),
            status: WorkstreamStatus::Running,
            runner_id: None,
            lease_expires_at_ms: None,
            completion_order: None,
            created_at_ms: 0,
            completed_at_ms: None,
        },
    );
    assert!(!all_workstreams_terminal(&state, &session_id));
}
