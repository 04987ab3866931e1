// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Steroids Runner Daemon (steroidsd)
//!
//! One long-lived process per active project (distilled spec §4.3): holds
//! the single-runner lock, drives the Orchestrator Loop, and heartbeats its
//! Runner row until told to stop. A runner attached to a parallel-session
//! workstream is a second kind of invocation of the same binary, scoped to
//! one workstream's worktree instead of the project root.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod lifecycle;
mod wakeup;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use steroids_adapters::{CliAgentInvoker, CliGitPort, ProcessHookDispatcher, StdProcessControl};
use steroids_core::ports::process::ProcessControl;
use steroids_core::{normalize_project_path, Clock, ParallelSessionId, SectionId, SystemClock, UuidIdGen};
use steroids_engine::{LoopStep, Orchestrator, SelectFilter};
use steroids_storage::ProjectStore;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

struct Args {
    project_path: PathBuf,
    focus_sections: Vec<SectionId>,
    session: Option<ParallelSessionId>,
}

fn print_help() {
    println!("steroidsd {}", env!("CARGO_PKG_VERSION"));
    println!("Runner Daemon for a single Steroids project");
    println!();
    println!("USAGE:");
    println!("    steroidsd <project-path> [--section <id>]... [--session <id>]");
    println!();
    println!("steroidsd is normally started by `steroids runner start` and should");
    println!("not be invoked directly.");
    println!();
    println!("OPTIONS:");
    println!("    --section <id>   Focus on one section (repeatable)");
    println!("    --session <id>   Attach as a parallel-session workstream runner");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

fn parse_args() -> Result<Option<Args>, String> {
    let mut raw = std::env::args().skip(1);
    let mut project_path = None;
    let mut focus_sections = Vec::new();
    let mut session = None;

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("steroidsd {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(None);
            }
            "--section" => {
                let id = raw.next().ok_or("--section requires a value")?;
                focus_sections.push(SectionId::new(id));
            }
            "--session" => {
                let id = raw.next().ok_or("--session requires a value")?;
                session = Some(ParallelSessionId::new(id));
            }
            other if project_path.is_none() => {
                project_path = Some(PathBuf::from(other));
            }
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }

    let project_path = project_path.ok_or("missing required <project-path> argument")?;
    Ok(Some(Args {
        project_path,
        focus_sections,
        session,
    }))
}

fn setup_logging(log_path: &std::path::Path) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file_appender = tracing_appender::rolling::never(
        log_path.parent().expect("log path has a parent"),
        log_path.file_name().expect("log path has a file name"),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return Ok(()),
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("Usage: steroidsd <project-path> [--section <id>]... [--session <id>]");
            std::process::exit(2);
        }
    };

    let state_dir = env::state_dir()?;
    let project_path = normalize_project_path(&args.project_path);
    let project_path_str = project_path.display().to_string();

    let process = StdProcessControl::new();
    let log_path = env::log_path(&state_dir, process.self_pid());
    let _log_guard = setup_logging(&log_path)?;

    let config_path = project_path.join("steroids.toml");
    let config = steroids_core::Config::load(&config_path)?;

    let lock_path = env::runner_lock_path(&state_dir, &project_path_str);
    lifecycle::clear_stale_lock_if_dead(&lock_path, &process)?;
    let _lock_file = match lifecycle::acquire_lock(&lock_path) {
        Ok(file) => file,
        Err(lifecycle::LifecycleError::LockFailed(e)) => {
            eprintln!("steroidsd is already running for {project_path_str}");
            return Err(Box::new(e) as Box<dyn std::error::Error>);
        }
        Err(e) => return Err(Box::new(e) as Box<dyn std::error::Error>),
    };

    let store_dir = project_path.join(".steroids");
    let mut store = ProjectStore::open(&store_dir)?;
    let clock = SystemClock::default();
    let id_gen = UuidIdGen::default();

    lifecycle::preflight(
        store.state(),
        clock.epoch_ms(),
        config.runners.stale_threshold_ms,
        &args.focus_sections,
    )?;

    let focus_section = args.focus_sections.first().cloned();
    let runner_id = lifecycle::register(
        &mut store,
        &id_gen,
        &process,
        &project_path_str,
        focus_section,
        args.session.clone(),
        clock.epoch_ms(),
    )?;

    info!(runner = %runner_id, project = %project_path_str, "runner started");

    let stop_requested = Arc::new(AtomicBool::new(false));

    let agent_command = env::agent_command();
    let hook_command = env::hook_command();
    let orchestrator = Orchestrator {
        agent_invoker: CliAgentInvoker::new(
            agent_command,
            config.ai_role("coder"),
            config.ai_role("reviewer"),
            Duration::from_millis(config.runners.invocation_timeout_ms),
        ),
        git: CliGitPort::new(),
        hooks: ProcessHookDispatcher::new(hook_command),
        clock: SystemClock::default(),
        id_gen: UuidIdGen::default(),
        runner_id: runner_id.clone(),
        project_path: project_path.clone(),
        git_remote: config.git.remote.clone(),
        git_branch: config.git.branch.clone(),
        backoff: Duration::from_millis(config.runners.inter_iteration_sleep_ms),
        config_path: config_path.clone(),
        credit_poll_max_wait_ms: config.credit.poll_max_wait_ms,
        batch_mode: config.sections.batch_mode,
        max_batch_size: config.sections.max_batch_size as usize,
        stop_requested: Arc::clone(&stop_requested),
    };

    {
        let stop_requested = Arc::clone(&stop_requested);
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {}
                _ = sigint.recv() => {}
            }
            info!("shutdown signal received, finishing current invocation");
            stop_requested.store(true, Ordering::Relaxed);
        });
    }

    let filter = SelectFilter {
        section_ids: if args.focus_sections.is_empty() {
            None
        } else {
            Some(args.focus_sections.clone())
        },
        focus_section: args.focus_sections.first().cloned(),
    };

    let mut last_heartbeat_ms = clock.epoch_ms();
    loop {
        if stop_requested.load(Ordering::Relaxed) {
            break;
        }

        let now_ms = clock.epoch_ms();
        if now_ms.saturating_sub(last_heartbeat_ms) >= config.runners.heartbeat_interval_ms {
            lifecycle::heartbeat(&mut store, runner_id.clone(), now_ms)?;
            last_heartbeat_ms = now_ms;
            if lifecycle::detect_superseded(store.state(), &runner_id, now_ms, config.runners.stale_threshold_ms) {
                warn!(runner = %runner_id, "superseded by an earlier active runner, exiting");
                break;
            }
        }

        match orchestrator.step(&mut store, &filter).await {
            Ok(LoopStep::AllComplete | LoopStep::Disabled) => break,
            Ok(LoopStep::Advanced { .. } | LoopStep::CreditPaused) => {
                tokio::time::sleep(orchestrator.backoff).await;
            }
            Err(e) => {
                error!(error = %e, "orchestrator step failed");
                tokio::time::sleep(orchestrator.backoff).await;
            }
        }
    }

    lifecycle::shutdown(&mut store, runner_id, clock.epoch_ms())?;
    store.checkpoint()?;
    info!("runner stopped");
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
