// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot envelope for crash recovery: the complete materialized state at
//! a point in time, identified by the WAL sequence number it covers.
//! Generic over the state type so both the Global Registry and the Project
//! Store reuse the same envelope and `.bak` rotation scheme.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<S> {
    pub version: u32,
    pub seq: u64,
    pub state: S,
    pub created_at: DateTime<Utc>,
}

impl<S> Snapshot<S> {
    pub fn new(version: u32, seq: u64, state: S) -> Self {
        Self {
            version,
            seq,
            state,
            created_at: Utc::now(),
        }
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out. Keeps
/// up to [`MAX_BAK_FILES`] backups; the oldest is removed at capacity.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
