// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `steroids projects register|list|enable|disable|remove` (distilled
//! spec §3.1 Project entity, §4.5 Global Registry).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use steroids_core::{normalize_project_path, Project};

use crate::commands::support::{now_ms, open_registry_store};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub action: ProjectsAction,
}

#[derive(Debug, Subcommand)]
pub enum ProjectsAction {
    /// Register a project directory with the Global Registry.
    Register {
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// List every registered project.
    List,
    /// Enable a disabled project.
    Enable { path: PathBuf },
    /// Disable a project (Wakeup will no longer start runners for it).
    Disable { path: PathBuf },
    /// Remove a project from the registry. Does not touch its store on disk.
    Remove { path: PathBuf },
}

pub fn run(args: ProjectsArgs, format: OutputFormat) -> Result<()> {
    let mut registry = open_registry_store()?;
    let now = now_ms();

    match args.action {
        ProjectsAction::Register { path, name } => {
            let normalized = normalize_project_path(&path);
            let normalized_str = normalized.display().to_string();
            registry
                .register_project(Project {
                    path: normalized_str.clone(),
                    name,
                    enabled: true,
                    registered_at_ms: now,
                    last_seen_at_ms: now,
                    stats: None,
                })
                .with_context(|| format!("failed to register {normalized_str}"))?;
            registry.checkpoint()?;
            println!("registered {normalized_str}");
            Ok(())
        }
        ProjectsAction::List => {
            let projects: Vec<_> = registry.state().projects.values().cloned().collect();
            crate::output::emit(format, &projects, |projects| {
                if projects.is_empty() {
                    return "no projects registered".to_string();
                }
                projects
                    .iter()
                    .map(|p| {
                        format!(
                            "{}  enabled={}  name={:?}  last_seen={}",
                            p.path,
                            p.enabled,
                            p.name,
                            crate::output::format_time_ago(p.last_seen_at_ms)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            });
            Ok(())
        }
        ProjectsAction::Enable { path } => set_enabled(&mut registry, &path, true, now),
        ProjectsAction::Disable { path } => set_enabled(&mut registry, &path, false, now),
        ProjectsAction::Remove { path } => {
            let normalized = normalize_project_path(&path);
            let normalized_str = normalized.display().to_string();
            registry.remove_project(&normalized_str)?;
            registry.checkpoint()?;
            println!("removed {normalized_str}");
            Ok(())
        }
    }
}

fn set_enabled(
    registry: &mut steroids_storage::registry::RegistryStore,
    path: &std::path::Path,
    enabled: bool,
    now: u64,
) -> Result<()> {
    let normalized = normalize_project_path(path);
    let normalized_str = normalized.display().to_string();
    registry.set_enabled(&normalized_str, enabled, now)?;
    registry.checkpoint()?;
    println!("{normalized_str} enabled={enabled}");
    Ok(())
}
