// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for resolving a project path and opening its stores.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use steroids_core::{normalize_project_path, Clock, Config, SystemClock};
use steroids_storage::registry::RegistryStore;
use steroids_storage::ProjectStore;

/// Resolve the project directory a command should operate on: an explicit
/// path argument, else the current working directory.
pub fn resolve_project_path(explicit: Option<&Path>) -> Result<PathBuf> {
    let raw = match explicit {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().context("failed to determine the current directory")?,
    };
    Ok(normalize_project_path(&raw))
}

pub fn open_project_store(project_path: &Path) -> Result<ProjectStore> {
    let store_dir = project_path.join(".steroids");
    ProjectStore::open(&store_dir)
        .with_context(|| format!("failed to open project store at {}", store_dir.display()))
}

pub fn open_registry_store() -> Result<RegistryStore> {
    let state_dir = steroids_daemon::env::state_dir().context("failed to determine state directory")?;
    RegistryStore::open(&state_dir).context("failed to open the global project registry")
}

pub fn load_config(project_path: &Path) -> Result<Config> {
    Config::load(&project_path.join("steroids.toml"))
        .with_context(|| format!("failed to load steroids.toml under {}", project_path.display()))
}

pub fn now_ms() -> u64 {
    SystemClock::default().epoch_ms()
}
