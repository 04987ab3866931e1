// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Selector: picks the next task (and its action) for the Orchestrator
//! Loop, and the batch of pending tasks for a single section.

use steroids_core::{Section, SectionId, Task, TaskAction, TaskId, TaskStatus, MAX_REJECTIONS};
use steroids_storage::ProjectState;
use std::collections::HashMap;

/// Restricts candidate sections for selection.
#[derive(Debug, Clone, Default)]
pub struct SelectFilter {
    pub section_ids: Option<Vec<SectionId>>,
    pub focus_section: Option<SectionId>,
}

impl SelectFilter {
    pub fn allows(&self, section_id: &SectionId) -> bool {
        if let Some(focus) = &self.focus_section {
            return focus == section_id;
        }
        if let Some(ids) = &self.section_ids {
            return ids.contains(section_id);
        }
        true
    }
}

fn section_depends_on_pending_work(
    section: &Section,
    state: &ProjectState,
    sections_by_id: &HashMap<SectionId, &Section>,
) -> bool {
    section.depends_on.iter().any(|dep_id| {
        let Some(_dep) = sections_by_id.get(dep_id) else {
            return false;
        };
        state.tasks.values().any(|t| {
            t.section_id.as_ref() == Some(dep_id)
                && matches!(
                    t.status,
                    TaskStatus::Pending | TaskStatus::InProgress | TaskStatus::Review
                )
        })
    })
}

fn is_unblocked(
    section: &Section,
    state: &ProjectState,
    sections_by_id: &HashMap<SectionId, &Section>,
) -> bool {
    !section.skipped && !section_depends_on_pending_work(section, state, sections_by_id)
}

/// `(status bucket, section.position, section.priority, created_at, id)` —
/// lower sorts first, mirroring distilled spec §4.1's priority rule.
fn sort_key(task: &Task, section: Option<&Section>) -> (u8, i64, i64, u64, String) {
    let bucket = task.status.selection_bucket().unwrap_or(u8::MAX);
    let position = section.map(|s| s.position).unwrap_or(i64::MAX);
    let priority = section.map(|s| s.priority).unwrap_or(i64::MAX);
    (bucket, position, priority, task.created_at_ms, task.id.to_string())
}

/// Tasks that are stuck `in_progress` at the rejection ceiling should have
/// already been transitioned to `failed`; the selector never hands one back
/// out, and logs so a recovery pass can fix the inconsistency.
fn is_selectable(task: &Task) -> bool {
    if task.status.selection_bucket().is_none() {
        return false;
    }
    if task.status == TaskStatus::InProgress && task.rejection_count >= MAX_REJECTIONS {
        tracing::warn!(
            task_id = %task.id,
            rejection_count = task.rejection_count,
            "selector found in_progress task at or past the rejection ceiling; skipping and \
             flagging for recovery"
        );
        return false;
    }
    true
}

/// `selectNext(store, filter) -> (task, action) | none` (distilled spec §4.1).
pub fn select_next(state: &ProjectState, filter: &SelectFilter) -> Option<(Task, TaskAction)> {
    let sections_by_id: HashMap<SectionId, &Section> =
        state.sections.iter().map(|(id, s)| (id.clone(), s)).collect();

    let mut candidates: Vec<&Task> = state
        .tasks
        .values()
        .filter(|t| is_selectable(t))
        .filter(|t| match &t.section_id {
            Some(section_id) => {
                filter.allows(section_id)
                    && sections_by_id
                        .get(section_id)
                        .is_some_and(|s| is_unblocked(s, state, &sections_by_id))
            }
            None => filter.focus_section.is_none(),
        })
        .collect();

    candidates.sort_by(|a, b| {
        let sa = a.section_id.as_ref().and_then(|id| sections_by_id.get(id)).copied();
        let sb = b.section_id.as_ref().and_then(|id| sections_by_id.get(id)).copied();
        sort_key(a, sa).cmp(&sort_key(b, sb))
    });

    let task = candidates.into_iter().next()?;
    let action = TaskAction::for_status(task.status)?;
    Some((task.clone(), action))
}

/// `selectBatch(store, maxSize) -> (section, tasks[])` (distilled spec §4.1).
/// Disabled when a focus section is active — the caller should check
/// `filter.focus_section.is_none()` before calling, but this also returns
/// `None` defensively in that case.
pub fn select_batch(
    state: &ProjectState,
    filter: &SelectFilter,
    max_size: usize,
) -> Option<(Section, Vec<Task>)> {
    if filter.focus_section.is_some() {
        return None;
    }

    let sections_by_id: HashMap<SectionId, &Section> =
        state.sections.iter().map(|(id, s)| (id.clone(), s)).collect();

    let mut candidate_sections: Vec<&Section> = state
        .sections
        .values()
        .filter(|s| filter.allows(&s.id))
        .filter(|s| is_unblocked(s, state, &sections_by_id))
        .filter(|s| {
            state
                .tasks
                .values()
                .any(|t| t.section_id.as_ref() == Some(&s.id) && t.status == TaskStatus::Pending)
        })
        .collect();

    candidate_sections.sort_by_key(|s| (s.position, s.priority));
    let section = candidate_sections.into_iter().next()?;

    let mut tasks: Vec<Task> = state
        .tasks
        .values()
        .filter(|t| t.section_id.as_ref() == Some(&section.id) && t.status == TaskStatus::Pending)
        .cloned()
        .collect();
    tasks.sort_by_key(|t| (t.created_at_ms, t.id.to_string()));
    tasks.truncate(max_size);

    Some((section.clone(), tasks))
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
