// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! steroids - orchestration control plane for Coder/Reviewer agent loops.

mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};

use commands::disputes::DisputesArgs;
use commands::hooks::HooksArgs;
use commands::loop_cmd::LoopArgs;
use commands::projects::ProjectsArgs;
use commands::runner::RunnerArgs;
use commands::sections::SectionsArgs;
use commands::stats::StatsArgs;
use commands::tasks::TasksArgs;
use commands::wakeup::WakeupArgs;
use commands::workspaces::WorkspacesArgs;
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "steroids",
    version,
    about = "Orchestration control plane for Coder/Reviewer agent loops"
)]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start, stop, or inspect a project's Runner Daemon.
    Runner(RunnerArgs),
    /// Run the Orchestrator Loop in the foreground for one project.
    Loop(LoopArgs),
    /// Run one reconciliation pass over every registered project.
    Wakeup(WakeupArgs),
    /// Inspect and manage tasks.
    Tasks(TasksArgs),
    /// Inspect and manage sections.
    Sections(SectionsArgs),
    /// Manage the Global Registry of known projects.
    Projects(ProjectsArgs),
    /// Inspect and clean up parallel workstream clones.
    Workspaces(WorkspacesArgs),
    /// Inspect and resolve disputes.
    Disputes(DisputesArgs),
    /// Show a project's task-count breakdown.
    Stats(StatsArgs),
    /// Inspect and test the configured lifecycle hook command.
    Hooks(HooksArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.output;

    let result = match cli.command {
        Commands::Runner(args) => commands::runner::run(args, format),
        Commands::Loop(args) => commands::loop_cmd::run(args).await,
        Commands::Wakeup(args) => commands::wakeup::run(args),
        Commands::Tasks(args) => commands::tasks::run(args, format).await,
        Commands::Sections(args) => commands::sections::run(args, format),
        Commands::Projects(args) => commands::projects::run(args, format),
        Commands::Workspaces(args) => commands::workspaces::run(args, format),
        Commands::Disputes(args) => commands::disputes::run(args, format),
        Commands::Stats(args) => commands::stats::run(args, format),
        Commands::Hooks(args) => commands::hooks::run(args).await,
    };

    if let Err(err) = result {
        std::process::exit(handle_error(err));
    }
}

fn handle_error(err: anyhow::Error) -> i32 {
    let code = err.downcast_ref::<ExitError>().map_or(1, |e| e.code);
    eprintln!("Error: {}", format_error(&err));
    code
}

/// Format an anyhow error, deduplicating the chain when the top-level
/// message already contains its source's text.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
