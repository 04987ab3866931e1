// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ProcessControl`: spawning and signaling processes.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Term,
    Kill,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to spawn process: {0}")]
    SpawnFailed(String),
    #[error("failed to signal pid {pid}: {source}")]
    SignalFailed { pid: u32, source: std::io::Error },
}

/// Process lifecycle control (distilled spec §4.11). SIGKILL is exposed for
/// completeness of the port but core logic never issues it (distilled spec
/// §5: "SIGKILL is never used by core logic").
pub trait ProcessControl: Send + Sync + 'static {
    fn spawn_detached(
        &self,
        cmd: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<u32, ProcessError>;
    fn kill(&self, pid: u32, signal: Signal) -> Result<(), ProcessError>;
    fn is_alive(&self, pid: u32) -> bool;
    fn self_pid(&self) -> u32;
}
