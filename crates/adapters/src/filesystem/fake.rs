// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `Filesystem` fake for deterministic testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use steroids_core::ports::filesystem::{Filesystem, FilesystemError};

#[derive(Clone, Default)]
pub struct FakeFilesystem {
    dirs: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl FakeFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a path as already existing, without needing `mkdir_all`.
    pub fn seed(&self, path: &Path) {
        self.dirs.lock().insert(path.to_path_buf());
    }
}

impl Filesystem for FakeFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.dirs.lock().contains(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, FilesystemError> {
        if !self.exists(path) {
            return Err(FilesystemError::Io {
                path: path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
            });
        }
        Ok(self
            .dirs
            .lock()
            .iter()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }

    fn mkdir_all(&self, path: &Path) -> Result<(), FilesystemError> {
        let mut dirs = self.dirs.lock();
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            dirs.insert(current.clone());
        }
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> Result<(), FilesystemError> {
        self.dirs.lock().retain(|p| !p.starts_with(path));
        Ok(())
    }

    fn realpath(&self, path: &Path) -> Result<PathBuf, FilesystemError> {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
