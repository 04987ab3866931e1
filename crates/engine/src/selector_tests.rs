// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use steroids_storage::ProjectState;

fn section(id: &str, position: i64, priority: i64, skipped: bool, depends_on: Vec<&str>) -> Section {
    Section {
        id: SectionId::new(id),
        name: id.to_string(),
        position,
        priority,
        skipped,
        depends_on: depends_on.into_iter().map(SectionId::new).collect(),
    }
}

fn task(id: &str, section_id: Option<&str>, status: TaskStatus, created_at_ms: u64) -> Task {
    Task {
        id: TaskId::new(id),
        title: id.to_string(),
        section_id: section_id.map(SectionId::new),
        status,
        rejection_count: 0,
        source_file: None,
        file_path: None,
        file_line: None,
        file_commit_sha: None,
        file_content_hash: None,
        created_at_ms,
        updated_at_ms: created_at_ms,
    }
}

fn state_with(sections: Vec<Section>, tasks: Vec<Task>) -> ProjectState {
    let mut state = ProjectState::default();
    for s in sections {
        state.sections.insert(s.id.clone(), s);
    }
    for t in tasks {
        state.tasks.insert(t.id.clone(), t);
    }
    state
}

#[test]
fn prefers_review_over_in_progress_over_pending() {
    let state = state_with(
        vec![section("s1", 0, 0, false, vec![])],
        vec![
            task("t-pending", Some("s1"), TaskStatus::Pending, 1),
            task("t-progress", Some("s1"), TaskStatus::InProgress, 2),
            task("t-review", Some("s1"), TaskStatus::Review, 3),
        ],
    );
    let (task, action) = select_next(&state, &SelectFilter::default()).unwrap();
    assert_eq!(task.id, TaskId::new("t-review"));
    assert_eq!(action, TaskAction::Review);
}

#[test]
fn breaks_ties_by_section_position_then_created_at_then_id() {
    let state = state_with(
        vec![
            section("later", 5, 0, false, vec![]),
            section("earlier", 0, 0, false, vec![]),
        ],
        vec![
            task("from-later", Some("later"), TaskStatus::Pending, 1),
            task("from-earlier", Some("earlier"), TaskStatus::Pending, 100),
        ],
    );
    let (task, _) = select_next(&state, &SelectFilter::default()).unwrap();
    assert_eq!(task.id, TaskId::new("from-earlier"));
}

#[test]
fn never_selects_tasks_in_a_skipped_section() {
    let state = state_with(
        vec![section("s1", 0, 0, true, vec![])],
        vec![task("t1", Some("s1"), TaskStatus::Pending, 1)],
    );
    assert!(select_next(&state, &SelectFilter::default()).is_none());
}

#[test]
fn never_selects_a_section_blocked_on_an_incomplete_dependency() {
    let state = state_with(
        vec![
            section("base", 0, 0, false, vec![]),
            section("dependent", 1, 0, false, vec!["base"]),
        ],
        vec![
            task("base-task", Some("base"), TaskStatus::InProgress, 1),
            task("dependent-task", Some("dependent"), TaskStatus::Pending, 2),
        ],
    );
    let (task, _) = select_next(&state, &SelectFilter::default()).unwrap();
    assert_eq!(task.id, TaskId::new("base-task"));
}

#[test]
fn unblocks_dependent_section_once_dependency_tasks_are_terminal() {
    let state = state_with(
        vec![
            section("base", 0, 0, false, vec![]),
            section("dependent", 1, 0, false, vec!["base"]),
        ],
        vec![
            task("base-task", Some("base"), TaskStatus::Completed, 1),
            task("dependent-task", Some("dependent"), TaskStatus::Pending, 2),
        ],
    );
    let (task, _) = select_next(&state, &SelectFilter::default()).unwrap();
    assert_eq!(task.id, TaskId::new("dependent-task"));
}

#[test]
fn excludes_terminal_statuses() {
    let state = state_with(
        vec![section("s1", 0, 0, false, vec![])],
        vec![
            task("completed", Some("s1"), TaskStatus::Completed, 1),
            task("failed", Some("s1"), TaskStatus::Failed, 2),
            task("skipped", Some("s1"), TaskStatus::Skipped, 3),
            task("partial", Some("s1"), TaskStatus::Partial, 4),
            task("disputed", Some("s1"), TaskStatus::Disputed, 5),
        ],
    );
    assert!(select_next(&state, &SelectFilter::default()).is_none());
}

#[test]
fn skips_stuck_in_progress_task_at_rejection_ceiling() {
    let mut stuck = task("stuck", Some("s1"), TaskStatus::InProgress, 1);
    stuck.rejection_count = MAX_REJECTIONS;
    let state = state_with(vec![section("s1", 0, 0, false, vec![])], vec![stuck]);
    assert!(select_next(&state, &SelectFilter::default()).is_none());
}

#[test]
fn focus_section_restricts_candidates_and_ignores_sectionless_tasks() {
    let state = state_with(
        vec![section("s1", 0, 0, false, vec![]), section("s2", 1, 0, false, vec![])],
        vec![
            task("in-s1", Some("s1"), TaskStatus::Pending, 1),
            task("in-s2", Some("s2"), TaskStatus::Pending, 2),
        ],
    );
    let filter = SelectFilter {
        section_ids: None,
        focus_section: Some(SectionId::new("s2")),
    };
    let (task, _) = select_next(&state, &filter).unwrap();
    assert_eq!(task.id, TaskId::new("in-s2"));
}

#[test]
fn select_batch_picks_highest_priority_unblocked_section_with_pending_work() {
    let state = state_with(
        vec![
            section("low-pos", 0, 0, false, vec![]),
            section("high-pos", 1, 0, false, vec![]),
        ],
        vec![
            task("t1", Some("low-pos"), TaskStatus::Pending, 1),
            task("t2", Some("low-pos"), TaskStatus::Pending, 2),
            task("t3", Some("high-pos"), TaskStatus::Pending, 3),
        ],
    );
    let (section, tasks) = select_batch(&state, &SelectFilter::default(), 10).unwrap();
    assert_eq!(section.id, SectionId::new("low-pos"));
    assert_eq!(tasks.len(), 2);
}

#[test]
fn select_batch_respects_max_size_and_selection_order() {
    let state = state_with(
        vec![section("s1", 0, 0, false, vec![])],
        vec![
            task("t-newer", Some("s1"), TaskStatus::Pending, 5),
            task("t-older", Some("s1"), TaskStatus::Pending, 1),
        ],
    );
    let (_, tasks) = select_batch(&state, &SelectFilter::default(), 1).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, TaskId::new("t-older"));
}

#[test]
fn select_batch_is_disabled_when_focus_section_is_active() {
    let state = state_with(
        vec![section("s1", 0, 0, false, vec![])],
        vec![task("t1", Some("s1"), TaskStatus::Pending, 1)],
    );
    let filter = SelectFilter {
        section_ids: None,
        focus_section: Some(SectionId::new("s1")),
    };
    assert!(select_batch(&state, &filter, 10).is_none());
}
