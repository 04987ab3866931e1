// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `steroids workspaces list|clean` (distilled spec §4.7/§4.8).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::commands::support::{open_project_store, resolve_project_path};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct WorkspacesArgs {
    #[arg(long = "dir", short = 'C', global = true)]
    pub dir: Option<PathBuf>,
    #[command(subcommand)]
    pub action: WorkspacesAction,
}

#[derive(Debug, Subcommand)]
pub enum WorkspacesAction {
    /// List parallel-session workstreams and their clone paths.
    List,
    /// Remove clone directories for workstreams whose session has finished.
    Clean {
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn run(args: WorkspacesArgs, format: OutputFormat) -> Result<()> {
    let project_path = resolve_project_path(args.dir.as_deref())?;
    let store = open_project_store(&project_path)?;

    match args.action {
        WorkspacesAction::List => {
            let workstreams: Vec<_> = store.state().workstreams.values().cloned().collect();
            crate::output::emit(format, &workstreams, |workstreams| {
                if workstreams.is_empty() {
                    return "no workstreams".to_string();
                }
                workstreams
                    .iter()
                    .map(|w| {
                        format!(
                            "{}  session={}  branch={}  status={:?}  clone={}",
                            w.id, w.session_id, w.branch_name, w.status, w.clone_path
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            });
            Ok(())
        }
        WorkspacesAction::Clean { dry_run } => {
            let mut cleaned = Vec::new();
            for workstream in store.state().workstreams.values() {
                let Some(session) = store.state().parallel_sessions.get(&workstream.session_id) else {
                    continue;
                };
                if !workstream.is_cleanable(session.status) {
                    continue;
                }
                if !dry_run {
                    let _ = std::fs::remove_dir_all(&workstream.clone_path);
                }
                cleaned.push(workstream.clone_path.clone());
            }
            if cleaned.is_empty() {
                println!("nothing to clean");
            } else {
                let verb = if dry_run { "would remove" } else { "removed" };
                for path in &cleaned {
                    println!("{verb} {path}");
                }
            }
            Ok(())
        }
    }
}
