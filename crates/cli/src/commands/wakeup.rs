// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `steroids wakeup [--dry-run]` (distilled spec §4.4): the cron-driven
//! reconciliation pass over every registered, enabled project.

use anyhow::{Context, Result};
use clap::Args;
use steroids_adapters::StdProcessControl;
use steroids_core::ports::ProcessControl;
use steroids_core::Clock;
use steroids_daemon::wakeup::{run_project_pass, ProjectAction};

use crate::commands::support::{load_config, open_project_store, open_registry_store};

#[derive(Debug, Args)]
pub struct WakeupArgs {
    /// Report what would happen without starting runners or mutating state.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: WakeupArgs) -> Result<()> {
    let now_ms = steroids_core::SystemClock::default().epoch_ms();
    let process = StdProcessControl::new();
    let mut registry = open_registry_store()?;

    let projects: Vec<_> = registry
        .state()
        .projects
        .values()
        .filter(|p| p.enabled)
        .cloned()
        .collect();

    for project in projects {
        let project_path = std::path::PathBuf::from(&project.path);
        let config = match load_config(&project_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("skipping {}: {e}", project.path);
                continue;
            }
        };

        let mut store = match open_project_store(&project_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("skipping {}: {e}", project.path);
                continue;
            }
        };

        let state_dir = steroids_daemon::env::state_dir()?;
        let lock_path = steroids_daemon::env::runner_lock_path(&state_dir, &project.path);
        let reaped = steroids_daemon::wakeup::reap_stale_runners(
            &mut store,
            &process,
            now_ms,
            config.runners.stale_threshold_ms,
            args.dry_run,
        )?;
        let released = steroids_daemon::wakeup::release_expired_leases(&mut store, now_ms, args.dry_run)?;
        let lock_cleaned = steroids_daemon::wakeup::clean_zombie_lock(&lock_path, &process, args.dry_run)?;

        let project_path_for_spawn = project_path.clone();
        let sections_bin = steroidsd_binary();
        let outcome = run_project_pass(
            &mut store,
            &project.path,
            now_ms,
            config.recovery.stuck_in_progress_age_ms,
            config.recovery.stuck_review_age_ms,
            args.dry_run,
            || {
                process
                    .spawn_detached(
                        &sections_bin.display().to_string(),
                        &[project.path.clone()],
                        &project_path_for_spawn,
                    )
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
            },
        )?;

        if !reaped.is_empty() {
            println!("{}: reaped {} stale runner(s)", project.path, reaped.len());
        }
        if released > 0 {
            println!("{}: released {released} expired lease(s)", project.path);
        }
        if lock_cleaned {
            println!("{}: removed a zombie lock", project.path);
        }
        if !outcome.recovery.is_empty() {
            println!("{}: recovered {} stuck task(s)", project.path, outcome.recovery.len());
        }
        match outcome.action {
            ProjectAction::Started => println!("{}: started a runner", project.path),
            ProjectAction::WouldStart => println!("{}: would start a runner (dry run)", project.path),
            ProjectAction::Cleaned => println!("{}: already has an active runner", project.path),
            ProjectAction::None => {}
        }

        if !args.dry_run {
            let stats = steroids_daemon::lifecycle::compute_stats(store.state());
            registry
                .update_stats(&project.path, stats)
                .with_context(|| format!("failed to sync stats for {}", project.path))?;
            store.checkpoint()?;
        }
    }

    if !args.dry_run {
        registry.checkpoint().context("failed to checkpoint the global registry")?;
    }

    Ok(())
}

fn steroidsd_binary() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("STEROIDS_DAEMON_BIN") {
        return std::path::PathBuf::from(path);
    }
    if let Ok(current) = std::env::current_exe() {
        if let Some(dir) = current.parent() {
            let sibling = dir.join("steroidsd");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    std::path::PathBuf::from("steroidsd")
}
