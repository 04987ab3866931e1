// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Filesystem`: the file-system operations the core depends on, so
//! Project Store / Workspaces logic can be tested against an in-memory
//! fake instead of touching disk.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FilesystemError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait Filesystem: Send + Sync + 'static {
    fn exists(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, FilesystemError>;
    fn mkdir_all(&self, path: &Path) -> Result<(), FilesystemError>;
    fn remove_all(&self, path: &Path) -> Result<(), FilesystemError>;
    fn realpath(&self, path: &Path) -> Result<PathBuf, FilesystemError>;
}
