// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `steroids sections list|add|skip|unskip` (distilled spec §3.1/§4.1).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use steroids_core::section::would_create_cycle;
use steroids_core::{Section, SectionId};

use crate::commands::support::{open_project_store, resolve_project_path};
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct SectionsArgs {
    #[arg(long = "dir", short = 'C', global = true)]
    pub dir: Option<PathBuf>,
    #[command(subcommand)]
    pub action: SectionsAction,
}

#[derive(Debug, Subcommand)]
pub enum SectionsAction {
    /// List sections in priority order.
    List,
    /// Create a new section.
    Add {
        id: String,
        name: String,
        #[arg(long, default_value_t = 0)]
        position: i64,
        #[arg(long, default_value_t = 0)]
        priority: i64,
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,
    },
    /// Mark a section skipped (its tasks become unselectable).
    Skip { id: String },
    /// Clear a section's skipped flag.
    Unskip { id: String },
}

pub fn run(args: SectionsArgs, format: OutputFormat) -> Result<()> {
    let project_path = resolve_project_path(args.dir.as_deref())?;
    let mut store = open_project_store(&project_path)?;

    match args.action {
        SectionsAction::List => {
            let mut sections: Vec<_> = store.state().sections.values().cloned().collect();
            sections.sort_by_key(|s| (s.priority, s.position));
            crate::output::emit(format, &sections, |sections| {
                if sections.is_empty() {
                    return "no sections".to_string();
                }
                sections
                    .iter()
                    .map(|s| {
                        format!(
                            "{}  {}  priority={}  position={}  skipped={}",
                            s.id, s.name, s.priority, s.position, s.skipped
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            });
            Ok(())
        }
        SectionsAction::Add { id, name, position, priority, depends_on } => {
            let section_id = SectionId::new(id);
            let depends_on: Vec<SectionId> = depends_on.into_iter().map(SectionId::new).collect();

            let mut edges: std::collections::HashMap<SectionId, Vec<SectionId>> = store
                .state()
                .sections
                .values()
                .map(|s| (s.id.clone(), s.depends_on.clone()))
                .collect();
            edges.insert(section_id.clone(), depends_on.clone());
            for dep in &depends_on {
                if would_create_cycle(&edges, &section_id, dep) {
                    return Err(ExitError::invalid_args(format!(
                        "adding {section_id} -> {dep} would create a dependency cycle"
                    ))
                    .into());
                }
            }

            store.create_section(Section {
                id: section_id.clone(),
                name,
                position,
                priority,
                skipped: false,
                depends_on,
            })?;
            println!("created section {section_id}");
            Ok(())
        }
        SectionsAction::Skip { id } => set_skipped(&mut store, id, true),
        SectionsAction::Unskip { id } => set_skipped(&mut store, id, false),
    }
}

fn set_skipped(store: &mut steroids_storage::ProjectStore, id: String, skipped: bool) -> Result<()> {
    let section_id = SectionId::new(id);
    let mut section = store
        .state()
        .sections
        .get(&section_id)
        .with_context(|| format!("section {section_id} not found"))?
        .clone();
    section.skipped = skipped;
    store.update_section(section)?;
    println!("section {section_id} skipped={skipped}");
    Ok(())
}
