// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `steroids runner start|stop|status|list` (distilled spec §4.3/§6).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use steroids_core::ports::process::{ProcessControl, Signal};

use crate::commands::support::{load_config, now_ms, open_project_store, resolve_project_path};
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct RunnerArgs {
    /// Project directory (defaults to the current directory). Ignored by `list`.
    #[arg(long = "dir", short = 'C', global = true)]
    pub dir: Option<PathBuf>,
    #[command(subcommand)]
    pub action: RunnerAction,
}

#[derive(Debug, Subcommand)]
pub enum RunnerAction {
    /// Start a Runner Daemon for a project (spawns `steroidsd` detached).
    Start {
        #[arg(long = "section")]
        sections: Vec<String>,
    },
    /// Stop the active runner for a project.
    Stop,
    /// Show runner status for a project.
    Status,
    /// List every registered project and its runner activity.
    List,
}

pub fn run(args: RunnerArgs, format: OutputFormat) -> Result<()> {
    match args.action {
        RunnerAction::Start { sections } => start(args.dir, sections),
        RunnerAction::Stop => stop(args.dir),
        RunnerAction::Status => status(args.dir, format),
        RunnerAction::List => list(format),
    }
}

fn steroidsd_binary() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("STEROIDS_DAEMON_BIN") {
        return Ok(PathBuf::from(path));
    }
    if let Ok(current) = std::env::current_exe() {
        if let Some(dir) = current.parent() {
            let sibling = dir.join("steroidsd");
            if sibling.exists() {
                return Ok(sibling);
            }
        }
    }
    Ok(PathBuf::from("steroidsd"))
}

fn start(dir: Option<PathBuf>, sections: Vec<String>) -> Result<()> {
    let project_path = resolve_project_path(dir.as_deref())?;
    let config = load_config(&project_path)?;
    let project_path_str = project_path.display().to_string();

    let store = open_project_store(&project_path)?;
    let process = steroids_adapters::StdProcessControl::new();
    let focus_sections: Vec<_> = sections.iter().map(|s| steroids_core::SectionId::new(s.clone())).collect();
    steroids_daemon::lifecycle::preflight(
        store.state(),
        now_ms(),
        config.runners.stale_threshold_ms,
        &focus_sections,
    )
    .map_err(|e| ExitError::resource_locked(e.to_string()))?;

    let mut binary_args = vec![project_path_str.clone()];
    for section in &sections {
        binary_args.push("--section".to_string());
        binary_args.push(section.clone());
    }

    let binary = steroidsd_binary()?;
    let pid = process
        .spawn_detached(&binary.display().to_string(), &binary_args, &project_path)
        .with_context(|| format!("failed to spawn {}", binary.display()))?;

    println!("started runner for {project_path_str} (pid {pid})");
    Ok(())
}

fn stop(dir: Option<PathBuf>) -> Result<()> {
    let project_path = resolve_project_path(dir.as_deref())?;
    let store = open_project_store(&project_path)?;
    let process = steroids_adapters::StdProcessControl::new();

    let active: Vec<_> = store
        .state()
        .runners
        .values()
        .filter(|r| r.parallel_session_id.is_none())
        .cloned()
        .collect();

    if active.is_empty() {
        println!("no active runner for {}", project_path.display());
        return Ok(());
    }

    for runner in active {
        if let Some(pid) = runner.pid {
            process
                .kill(pid, Signal::Term)
                .with_context(|| format!("failed to signal runner pid {pid}"))?;
            println!("sent SIGTERM to runner {} (pid {pid})", runner.id);
        }
    }
    Ok(())
}

fn status(dir: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let project_path = resolve_project_path(dir.as_deref())?;
    let store = open_project_store(&project_path)?;

    let runners: Vec<_> = store.state().runners.values().cloned().collect();
    crate::output::emit(format, &runners, |runners| {
        if runners.is_empty() {
            return format!("no runners registered for {}", project_path.display());
        }
        runners
            .iter()
            .map(|runner| {
                format!(
                    "{}  status={}  pid={:?}  heartbeat={}",
                    runner.id,
                    runner.status,
                    runner.pid,
                    crate::output::format_time_ago(runner.heartbeat_at_ms)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    });
    Ok(())
}

fn list(format: OutputFormat) -> Result<()> {
    let registry = crate::commands::support::open_registry_store()?;
    let projects: Vec<_> = registry.state().projects.values().cloned().collect();
    crate::output::emit(format, &projects, |projects| {
        if projects.is_empty() {
            return "no projects registered".to_string();
        }
        projects
            .iter()
            .map(|p| format!("{}  enabled={}  name={:?}", p.path, p.enabled, p.name))
            .collect::<Vec<_>>()
            .join("\n")
    });
    Ok(())
}
