// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background checkpointing with zstd compression and durable fsync.
//!
//! The checkpointer runs I/O off the main thread while preserving the
//! invariant that matters for crash recovery: the snapshot must be durable
//! (including a directory fsync) before the WAL is truncated.
//!
//! ```text
//! Main Thread                    Background Thread
//! ───────────────────────────    ─────────────────────────────
//! clone state
//!   │
//!   └─────────────────────────→  serialize + compress
//!                                write to .tmp, fsync .tmp
//!                                rename → snapshot, fsync dir
//!                                  │
//!   ←────────────────────────────┘ (completion signal)
//! truncate WAL (safe now)
//! ```
//!
//! The `CheckpointWriter` trait abstracts all I/O so checkpoint sequencing
//! can be unit-tested with a fake writer and error injection.

use crate::snapshot::Snapshot;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("compression error: {0}")]
    Compress(String),
    #[error("checkpoint failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CheckpointResult {
    pub seq: u64,
    pub size_bytes: u64,
}

/// Abstracts checkpoint I/O for testability.
pub trait CheckpointWriter: Send + Sync + 'static {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> Result<(), CheckpointError>;
    fn fsync_file(&self, path: &Path) -> Result<(), CheckpointError>;
    fn rename(&self, from: &Path, to: &Path) -> Result<(), CheckpointError>;
    fn fsync_dir(&self, path: &Path) -> Result<(), CheckpointError>;
    fn file_size(&self, path: &Path) -> Result<u64, CheckpointError>;
}

#[derive(Clone, Default)]
pub struct FsCheckpointWriter;

impl CheckpointWriter for FsCheckpointWriter {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> Result<(), CheckpointError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(data)?;
        Ok(())
    }

    fn fsync_file(&self, path: &Path) -> Result<(), CheckpointError> {
        File::open(path)?.sync_all()?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), CheckpointError> {
        std::fs::rename(from, to)?;
        Ok(())
    }

    fn fsync_dir(&self, path: &Path) -> Result<(), CheckpointError> {
        File::open(path)?.sync_all()?;
        Ok(())
    }

    fn file_size(&self, path: &Path) -> Result<u64, CheckpointError> {
        Ok(std::fs::metadata(path)?.len())
    }
}

pub struct CheckpointHandle {
    pub seq: u64,
    receiver: mpsc::Receiver<Result<CheckpointResult, CheckpointError>>,
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

impl CheckpointHandle {
    /// Block until the checkpoint is fully durable. Only after this returns
    /// successfully is it safe to truncate the WAL.
    pub fn wait(self) -> Result<CheckpointResult, CheckpointError> {
        self.receiver
            .recv()
            .map_err(|_| CheckpointError::Failed("checkpoint thread panicked".into()))?
    }

    pub fn try_wait(&self) -> Option<Result<CheckpointResult, CheckpointError>> {
        self.receiver.try_recv().ok()
    }
}

/// Only one checkpoint runs at a time per `Checkpointer`; callers serialize
/// `start` calls themselves (the Runner Daemon holds one checkpointer per
/// store it owns).
pub struct Checkpointer<S, W: CheckpointWriter = FsCheckpointWriter> {
    writer: W,
    snapshot_path: PathBuf,
    version: u32,
    compression_level: i32,
    _state: std::marker::PhantomData<S>,
}

impl<S> Checkpointer<S, FsCheckpointWriter>
where
    S: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    pub fn new(snapshot_path: PathBuf, version: u32) -> Self {
        Self::with_writer(FsCheckpointWriter, snapshot_path, version)
    }
}

impl<S, W> Checkpointer<S, W>
where
    S: Serialize + DeserializeOwned + Clone + Send + 'static,
    W: CheckpointWriter + Clone,
{
    pub fn with_writer(writer: W, snapshot_path: PathBuf, version: u32) -> Self {
        Self {
            writer,
            snapshot_path,
            version,
            // zstd level 3 is a good balance of speed and compression
            compression_level: 3,
            _state: std::marker::PhantomData,
        }
    }

    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Start a background checkpoint. The returned handle must be waited on
    /// before truncating the WAL.
    pub fn start(&self, seq: u64, state: &S) -> CheckpointHandle {
        let state_clone = state.clone();
        let writer = self.writer.clone();
        let snapshot_path = self.snapshot_path.clone();
        let version = self.version;
        let compression_level = self.compression_level;

        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let result = checkpoint_blocking(
                &writer,
                seq,
                state_clone,
                &snapshot_path,
                version,
                compression_level,
            );
            let _ = tx.send(result);
        });

        CheckpointHandle {
            seq,
            receiver: rx,
            handle,
        }
    }

    /// Perform a synchronous checkpoint (used at graceful shutdown).
    pub fn checkpoint_sync(&self, seq: u64, state: &S) -> Result<CheckpointResult, CheckpointError> {
        checkpoint_blocking(
            &self.writer,
            seq,
            state.clone(),
            &self.snapshot_path,
            self.version,
            self.compression_level,
        )
    }
}

fn checkpoint_blocking<S, W>(
    writer: &W,
    seq: u64,
    state: S,
    snapshot_path: &Path,
    version: u32,
    compression_level: i32,
) -> Result<CheckpointResult, CheckpointError>
where
    S: Serialize,
    W: CheckpointWriter,
{
    let tmp_path = snapshot_path.with_extension("tmp");

    let snapshot = Snapshot::new(version, seq, state);
    let json_bytes = serde_json::to_vec(&snapshot)?;
    let compressed = zstd::encode_all(json_bytes.as_slice(), compression_level)
        .map_err(|e| CheckpointError::Compress(e.to_string()))?;

    writer.write_tmp(&tmp_path, &compressed)?;
    writer.fsync_file(&tmp_path)?;
    writer.rename(&tmp_path, snapshot_path)?;

    if let Some(parent) = snapshot_path.parent() {
        writer.fsync_dir(parent)?;
    }

    let size_bytes = writer
        .file_size(snapshot_path)
        .unwrap_or(compressed.len() as u64);

    Ok(CheckpointResult { seq, size_bytes })
}

/// Load a zstd-compressed snapshot, moving a corrupt one to `.bak` and
/// returning `None` so the caller falls back to full WAL replay.
pub fn load_snapshot<S: DeserializeOwned>(path: &Path) -> Result<Option<Snapshot<S>>, CheckpointError> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    let decoder = zstd::stream::read::Decoder::new(file)
        .map_err(|e| CheckpointError::Compress(e.to_string()))?;

    match serde_json::from_reader(decoder) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(e) => {
            let bak_path = crate::snapshot::rotate_bak_path(path);
            tracing::warn!(
                error = %e,
                path = %path.display(),
                bak = %bak_path.display(),
                "corrupt snapshot, moving to .bak and falling back to WAL replay",
            );
            std::fs::rename(path, &bak_path)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
