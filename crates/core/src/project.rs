// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registered projects and path normalization.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Materialized task-count stats cached on the `Project` row. Never
/// authoritative — recomputing from the Project Store is always correct
/// (distilled spec addition, §3.1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub pending: u32,
    pub in_progress: u32,
    pub review: u32,
    pub completed: u32,
}

/// A registered project. Identity is the normalized absolute path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub path: String,
    pub name: Option<String>,
    pub enabled: bool,
    pub registered_at_ms: u64,
    pub last_seen_at_ms: u64,
    pub stats: Option<ProjectStats>,
}

/// Normalize a path to its canonical absolute form: symlinks resolved,
/// trailing slash stripped. Falls back to lexical cleanup (no symlink
/// resolution) when the path does not exist on disk yet, so registering a
/// project that will be created later does not fail.
pub fn normalize_project_path(path: &Path) -> PathBuf {
    match std::fs::canonicalize(path) {
        Ok(canonical) => canonical,
        Err(_) => lexically_normalize(path),
    }
}

fn lexically_normalize(path: &Path) -> PathBuf {
    use std::path::Component;
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
