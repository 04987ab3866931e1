// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `steroids disputes list|resolve` (distilled spec §4.2 dispute handling).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use steroids_core::{Actor, DisputeId, DisputeStatus, TaskStatus};

use crate::commands::support::{now_ms, open_project_store, resolve_project_path};
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct DisputesArgs {
    #[arg(long = "dir", short = 'C', global = true)]
    pub dir: Option<PathBuf>,
    #[command(subcommand)]
    pub action: DisputesAction,
}

#[derive(Debug, Subcommand)]
pub enum DisputesAction {
    /// List disputes, open ones first.
    List,
    /// Resolve an open dispute, returning its task to `in_progress` or `completed`.
    Resolve {
        dispute_id: String,
        /// `in_progress` or `completed`.
        #[arg(long)]
        outcome: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

pub fn run(args: DisputesArgs, format: OutputFormat) -> Result<()> {
    let project_path = resolve_project_path(args.dir.as_deref())?;
    let mut store = open_project_store(&project_path)?;

    match args.action {
        DisputesAction::List => {
            let mut disputes: Vec<_> = store.state().disputes.values().cloned().collect();
            disputes.sort_by_key(|d| (d.status != DisputeStatus::Open, d.created_at_ms));
            crate::output::emit(format, &disputes, |disputes| {
                if disputes.is_empty() {
                    return "no disputes".to_string();
                }
                disputes
                    .iter()
                    .map(|d| {
                        format!(
                            "{}  task={}  type={:?}  status={:?}  reason={}",
                            d.id, d.task_id, d.dispute_type, d.status, d.reason
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            });
            Ok(())
        }
        DisputesAction::Resolve { dispute_id, outcome, notes } => {
            let id = DisputeId::new(dispute_id);
            let mut dispute = store
                .state()
                .disputes
                .get(&id)
                .with_context(|| format!("dispute {id} not found"))?
                .clone();
            if !dispute.is_open() {
                return Err(ExitError::invalid_args(format!("dispute {id} is already resolved")).into());
            }

            let new_task_status = match outcome.as_str() {
                "in_progress" => TaskStatus::InProgress,
                "completed" => TaskStatus::Completed,
                other => {
                    return Err(ExitError::invalid_args(format!(
                        "--outcome must be 'in_progress' or 'completed', got '{other}'"
                    ))
                    .into())
                }
            };

            let now = now_ms();
            dispute.status = DisputeStatus::Resolved;
            dispute.resolution = Some(outcome.clone());
            dispute.resolution_notes = notes.clone();
            dispute.resolved_by = Some("cli".to_string());
            dispute.resolved_at_ms = Some(now);
            store.resolve_dispute(dispute.clone())?;

            let task_id = dispute.task_id.clone();
            let mut task = store
                .state()
                .tasks
                .get(&task_id)
                .with_context(|| format!("task {task_id} for dispute {id} not found"))?
                .clone();
            task.status = new_task_status;
            task.updated_at_ms = now;
            store.transition_task(task, Actor::Human, notes, None, now)?;

            println!("dispute {id} resolved: task {task_id} -> {new_task_status}");
            Ok(())
        }
    }
}
