// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `steroids tasks list|show|add|skip|partial|reset|reset-rejections`
//! (distilled spec §3.1/§4.2/§4.6).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use steroids_adapters::ProcessHookDispatcher;
use steroids_core::ports::hook::{HookDispatcher, HookEvent};
use steroids_core::{Actor, ActivityEvent, ActivityKind, RunnerId, Task, TaskId, TaskStatus};

use crate::commands::support::{now_ms, open_project_store, resolve_project_path};
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

/// `RunnerId` recorded on activity rows produced by a CLI invocation rather
/// than an active orchestrator loop — there is no live `Runner` row to
/// attribute these to.
const CLI_RUNNER: &str = "cli";

#[derive(Debug, Args)]
pub struct TasksArgs {
    #[arg(long = "dir", short = 'C', global = true)]
    pub dir: Option<PathBuf>,
    #[command(subcommand)]
    pub action: TasksAction,
}

#[derive(Debug, Subcommand)]
pub enum TasksAction {
    /// List tasks, optionally filtered by section.
    List {
        #[arg(long)]
        section: Option<String>,
    },
    /// Show one task's current state and audit trail.
    Show { task_id: String },
    /// Create a new task in a section.
    Add {
        id: String,
        title: String,
        #[arg(long)]
        section: Option<String>,
    },
    /// Force a pending or in-progress task to `skipped`.
    Skip { task_id: String },
    /// Mark an in-progress task `partial` (some but not all of its work landed).
    Partial { task_id: String },
    /// Return a skipped, failed, or partial task to `pending`.
    Reset { task_id: String },
    /// Zero a task's rejection count without changing its status
    /// (distilled spec §4.6: a manual credit against the rejection ceiling).
    ResetRejections { task_id: String },
}

pub async fn run(args: TasksArgs, format: OutputFormat) -> Result<()> {
    let project_path = resolve_project_path(args.dir.as_deref())?;
    let mut store = open_project_store(&project_path)?;
    let hooks = ProcessHookDispatcher::new(steroids_daemon::env::hook_command());

    match args.action {
        TasksAction::List { section } => {
            let section_id = section.map(steroids_core::SectionId::new);
            let mut tasks: Vec<_> = store
                .state()
                .tasks
                .values()
                .filter(|t| section_id.as_ref().map_or(true, |s| t.section_id.as_ref() == Some(s)))
                .cloned()
                .collect();
            tasks.sort_by_key(|t| t.created_at_ms);
            crate::output::emit(format, &tasks, |tasks| {
                if tasks.is_empty() {
                    return "no tasks".to_string();
                }
                tasks
                    .iter()
                    .map(|t| format!("{}  [{}]  {}", t.id, t.status, t.title))
                    .collect::<Vec<_>>()
                    .join("\n")
            });
            Ok(())
        }
        TasksAction::Show { task_id } => {
            let id = TaskId::new(task_id);
            let task = store
                .state()
                .tasks
                .get(&id)
                .with_context(|| format!("task {id} not found"))?
                .clone();
            let audit: Vec<_> = store
                .state()
                .audit_log
                .iter()
                .filter(|a| a.task_id == id)
                .cloned()
                .collect();
            crate::output::emit(format, &(task.clone(), audit.clone()), |(task, audit)| {
                let mut out = format!(
                    "{}  [{}]  {}\nrejections: {}/{}\n",
                    task.id,
                    task.status,
                    task.title,
                    task.rejection_count,
                    steroids_core::MAX_REJECTIONS
                );
                for row in audit {
                    out.push_str(&format!(
                        "  {:?} -> {} by {} at {}\n",
                        row.from_status, row.to_status, row.actor, row.created_at_ms
                    ));
                }
                out
            });
            Ok(())
        }
        TasksAction::Add { id, title, section } => {
            let task_id = TaskId::new(id);
            let section_id = section.map(steroids_core::SectionId::new);
            if let Some(section_id) = &section_id {
                if !store.state().sections.contains_key(section_id) {
                    return Err(ExitError::invalid_args(format!("section {section_id} not found")).into());
                }
            }

            let at_ms = now_ms();
            store.create_task(Task {
                id: task_id.clone(),
                title,
                section_id,
                status: TaskStatus::Pending,
                rejection_count: 0,
                source_file: None,
                file_path: None,
                file_line: None,
                file_commit_sha: None,
                file_content_hash: None,
                created_at_ms: at_ms,
                updated_at_ms: at_ms,
            })?;

            hooks
                .fire(
                    &HookEvent::new("task.created"),
                    serde_json::json!({ "task_id": task_id.to_string() }),
                )
                .await;
            println!("created task {task_id}");
            Ok(())
        }
        TasksAction::Skip { task_id } => {
            let id = TaskId::new(task_id);
            let mut task = store
                .state()
                .tasks
                .get(&id)
                .with_context(|| format!("task {id} not found"))?
                .clone();
            if !matches!(task.status, TaskStatus::Pending | TaskStatus::InProgress) {
                return Err(ExitError::invalid_args(format!(
                    "task {id} is {}, cannot be skipped",
                    task.status
                ))
                .into());
            }
            let at_ms = now_ms();
            task.status = TaskStatus::Skipped;
            task.updated_at_ms = at_ms;
            store.transition_task(task.clone(), Actor::Human, None, None, at_ms)?;
            record_cli_activity(&mut store, &task, ActivityKind::Skipped, at_ms)?;
            hooks
                .fire(&HookEvent::new("task.updated"), serde_json::json!({ "task_id": id.to_string() }))
                .await;
            println!("{id} skipped");
            Ok(())
        }
        TasksAction::Partial { task_id } => {
            let id = TaskId::new(task_id);
            let mut task = store
                .state()
                .tasks
                .get(&id)
                .with_context(|| format!("task {id} not found"))?
                .clone();
            if task.status != TaskStatus::InProgress {
                return Err(ExitError::invalid_args(format!(
                    "task {id} is {}, can only mark in_progress tasks partial",
                    task.status
                ))
                .into());
            }
            let at_ms = now_ms();
            task.status = TaskStatus::Partial;
            task.updated_at_ms = at_ms;
            store.transition_task(task.clone(), Actor::Human, None, None, at_ms)?;
            record_cli_activity(&mut store, &task, ActivityKind::Partial, at_ms)?;
            hooks
                .fire(&HookEvent::new("task.updated"), serde_json::json!({ "task_id": id.to_string() }))
                .await;
            println!("{id} marked partial");
            Ok(())
        }
        TasksAction::Reset { task_id } => {
            let id = TaskId::new(task_id);
            let mut task = store
                .state()
                .tasks
                .get(&id)
                .with_context(|| format!("task {id} not found"))?
                .clone();
            if !matches!(task.status, TaskStatus::Skipped | TaskStatus::Failed | TaskStatus::Partial) {
                return Err(ExitError::invalid_args(format!(
                    "task {id} is {}, cannot be reset",
                    task.status
                ))
                .into());
            }
            task.status = TaskStatus::Pending;
            task.rejection_count = 0;
            task.updated_at_ms = now_ms();
            store.transition_task(task, Actor::Human, None, None, now_ms())?;
            println!("{id} reset to pending");
            Ok(())
        }
        TasksAction::ResetRejections { task_id } => {
            let id = TaskId::new(task_id);
            let mut task = store
                .state()
                .tasks
                .get(&id)
                .with_context(|| format!("task {id} not found"))?
                .clone();
            if task.status == TaskStatus::Failed {
                return Err(ExitError::invalid_args(format!(
                    "task {id} is failed at the rejection ceiling; use `tasks reset` to return it to pending"
                ))
                .into());
            }
            if task.rejection_count == 0 {
                println!("{id} already at 0 rejections");
                return Ok(());
            }
            task.rejection_count = 0;
            task.updated_at_ms = now_ms();
            store.record_task_note(
                task,
                Actor::Human,
                Some("reset-rejections".to_string()),
                now_ms(),
            )?;
            println!("{id} rejection count reset to 0");
            Ok(())
        }
    }
}

fn record_cli_activity(
    store: &mut steroids_storage::ProjectStore,
    task: &Task,
    kind: ActivityKind,
    at_ms: u64,
) -> Result<()> {
    store.append_activity(ActivityEvent {
        project_path: String::new(),
        runner_id: RunnerId::new(CLI_RUNNER),
        task_id: task.id.clone(),
        task_title: task.title.clone(),
        section_name: None,
        kind,
        commit_message: None,
        commit_sha: None,
        at_ms,
        seq: 0,
    })?;
    Ok(())
}
