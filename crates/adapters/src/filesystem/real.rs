// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `std::fs`-backed `Filesystem`.

use std::path::{Path, PathBuf};
use steroids_core::ports::filesystem::{Filesystem, FilesystemError};

#[derive(Clone, Copy, Default)]
pub struct StdFilesystem;

impl StdFilesystem {
    pub fn new() -> Self {
        Self
    }

    fn wrap<T>(path: &Path, result: std::io::Result<T>) -> Result<T, FilesystemError> {
        result.map_err(|source| FilesystemError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl Filesystem for StdFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, FilesystemError> {
        let entries = Self::wrap(path, std::fs::read_dir(path))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = Self::wrap(path, entry)?;
            paths.push(entry.path());
        }
        Ok(paths)
    }

    fn mkdir_all(&self, path: &Path) -> Result<(), FilesystemError> {
        Self::wrap(path, std::fs::create_dir_all(path))
    }

    fn remove_all(&self, path: &Path) -> Result<(), FilesystemError> {
        if !path.exists() {
            return Ok(());
        }
        if path.is_dir() {
            Self::wrap(path, std::fs::remove_dir_all(path))
        } else {
            Self::wrap(path, std::fs::remove_file(path))
        }
    }

    fn realpath(&self, path: &Path) -> Result<PathBuf, FilesystemError> {
        Self::wrap(path, std::fs::canonicalize(path))
    }
}

#[cfg(test)]
#[path = "real_tests.rs"]
mod tests;
