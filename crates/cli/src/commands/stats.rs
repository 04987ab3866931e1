// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `steroids stats`: recomputed task-count breakdown for one project
//! (distilled spec §3.1 `Project.stats`, always derivable from the store).

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use steroids_core::TaskStatus;
use steroids_daemon::lifecycle::compute_stats;

use crate::commands::support::{open_project_store, resolve_project_path};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(long = "dir", short = 'C')]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct FullStats {
    pending: u32,
    in_progress: u32,
    review: u32,
    completed: u32,
    disputed: u32,
    failed: u32,
}

pub fn run(args: StatsArgs, format: OutputFormat) -> Result<()> {
    let project_path = resolve_project_path(args.dir.as_deref())?;
    let store = open_project_store(&project_path)?;
    let base = compute_stats(store.state());

    let disputed = store.state().tasks.values().filter(|t| t.status == TaskStatus::Disputed).count() as u32;
    let failed = store.state().tasks.values().filter(|t| t.status == TaskStatus::Failed).count() as u32;

    let stats = FullStats {
        pending: base.pending,
        in_progress: base.in_progress,
        review: base.review,
        completed: base.completed,
        disputed,
        failed,
    };

    crate::output::emit(format, &stats, |s| {
        format!(
            "pending={}  in_progress={}  review={}  completed={}  disputed={}  failed={}",
            s.pending, s.in_progress, s.review, s.completed, s.disputed, s.failed
        )
    });
    Ok(())
}
