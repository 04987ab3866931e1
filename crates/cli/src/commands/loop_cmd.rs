// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `steroids loop <project>`: foreground Orchestrator Loop for one project,
//! for interactive use without a detached `steroidsd` process. Shares the
//! single-runner invariant and lock with the daemon — `steroids runner
//! start` and `steroids loop` can never both be active for one project.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use steroids_adapters::{CliAgentInvoker, CliGitPort, ProcessHookDispatcher, StdProcessControl};
use steroids_core::{Clock, SystemClock, UuidIdGen};
use steroids_engine::{LoopStep, Orchestrator, SelectFilter};

use crate::commands::support::{load_config, now_ms, open_project_store, resolve_project_path};
use crate::exit_error::ExitError;

#[derive(Debug, Args)]
pub struct LoopArgs {
    /// Project directory (defaults to the current directory).
    #[arg(long = "dir", short = 'C')]
    pub dir: Option<PathBuf>,
    #[arg(long = "section")]
    pub sections: Vec<String>,
}

pub async fn run(args: LoopArgs) -> Result<()> {
    let project_path = resolve_project_path(args.dir.as_deref())?;
    let config = load_config(&project_path)?;
    let focus_sections: Vec<_> = args
        .sections
        .iter()
        .map(|s| steroids_core::SectionId::new(s.clone()))
        .collect();

    let process = StdProcessControl::new();
    let state_dir = steroids_daemon::env::state_dir()?;
    let project_path_str = project_path.display().to_string();
    let lock_path = steroids_daemon::env::runner_lock_path(&state_dir, &project_path_str);
    steroids_daemon::lifecycle::clear_stale_lock_if_dead(&lock_path, &process)?;
    let _lock_file = steroids_daemon::lifecycle::acquire_lock(&lock_path)
        .map_err(|e| ExitError::resource_locked(e.to_string()))?;

    let mut store = open_project_store(&project_path)?;
    let clock = SystemClock::default();
    let id_gen = UuidIdGen::default();

    steroids_daemon::lifecycle::preflight(
        store.state(),
        clock.epoch_ms(),
        config.runners.stale_threshold_ms,
        &focus_sections,
    )
    .map_err(|e| ExitError::resource_locked(e.to_string()))?;

    let runner_id = steroids_daemon::lifecycle::register(
        &mut store,
        &id_gen,
        &process,
        &project_path_str,
        focus_sections.first().cloned(),
        None,
        clock.epoch_ms(),
    )?;

    let stop_requested = Arc::new(AtomicBool::new(false));

    let orchestrator = Orchestrator {
        agent_invoker: CliAgentInvoker::new(
            steroids_daemon::env::agent_command(),
            config.ai_role("coder"),
            config.ai_role("reviewer"),
            Duration::from_millis(config.runners.invocation_timeout_ms),
        ),
        git: CliGitPort::new(),
        hooks: ProcessHookDispatcher::new(steroids_daemon::env::hook_command()),
        clock: SystemClock::default(),
        id_gen: UuidIdGen::default(),
        runner_id: runner_id.clone(),
        project_path: project_path.clone(),
        git_remote: config.git.remote.clone(),
        git_branch: config.git.branch.clone(),
        backoff: Duration::from_millis(config.runners.inter_iteration_sleep_ms),
        config_path: project_path.join("steroids.toml"),
        credit_poll_max_wait_ms: config.credit.poll_max_wait_ms,
        batch_mode: config.sections.batch_mode,
        max_batch_size: config.sections.max_batch_size as usize,
        stop_requested: Arc::clone(&stop_requested),
    };

    {
        let stop_requested = Arc::clone(&stop_requested);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("\nstopping after the current invocation finishes...");
                stop_requested.store(true, Ordering::Relaxed);
            }
        });
    }

    let filter = SelectFilter {
        section_ids: if focus_sections.is_empty() { None } else { Some(focus_sections.clone()) },
        focus_section: focus_sections.first().cloned(),
    };

    let mut last_heartbeat_ms = now_ms();
    loop {
        if stop_requested.load(Ordering::Relaxed) {
            break;
        }
        let now = now_ms();
        if now.saturating_sub(last_heartbeat_ms) >= config.runners.heartbeat_interval_ms {
            steroids_daemon::lifecycle::heartbeat(&mut store, runner_id.clone(), now)?;
            last_heartbeat_ms = now;
        }

        match orchestrator.step(&mut store, &filter).await {
            Ok(LoopStep::AllComplete) => {
                println!("all selectable work complete");
                break;
            }
            Ok(LoopStep::Disabled) => {
                println!("project disabled");
                break;
            }
            Ok(LoopStep::Advanced { task_id }) => {
                println!("advanced task {task_id}");
                tokio::time::sleep(orchestrator.backoff).await;
            }
            Ok(LoopStep::CreditPaused) => {
                println!("paused: credit exhaustion incident open");
                tokio::time::sleep(orchestrator.backoff).await;
            }
            Err(e) => {
                eprintln!("error: {e}");
                tokio::time::sleep(orchestrator.backoff).await;
            }
        }
    }

    steroids_daemon::lifecycle::shutdown(&mut store, runner_id, now_ms())?;
    store.checkpoint().context("failed to checkpoint project store")?;
    Ok(())
}
