// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake `ProcessControl` for deterministic testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use steroids_core::ports::process::{ProcessControl, ProcessError, Signal};

#[derive(Clone)]
pub struct FakeProcessControl {
    next_pid: Arc<AtomicU32>,
    alive: Arc<Mutex<HashSet<u32>>>,
    spawn_error: Arc<Mutex<Option<String>>>,
}

impl Default for FakeProcessControl {
    fn default() -> Self {
        Self {
            next_pid: Arc::new(AtomicU32::new(1000)),
            alive: Arc::new(Mutex::new(HashSet::new())),
            spawn_error: Arc::new(Mutex::new(None)),
        }
    }
}

impl FakeProcessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_spawn_error(&self, message: &str) {
        *self.spawn_error.lock() = Some(message.to_string());
    }

    pub fn kill_externally(&self, pid: u32) {
        self.alive.lock().remove(&pid);
    }
}

impl ProcessControl for FakeProcessControl {
    fn spawn_detached(&self, _cmd: &str, _args: &[String], _cwd: &Path) -> Result<u32, ProcessError> {
        if let Some(message) = self.spawn_error.lock().take() {
            return Err(ProcessError::SpawnFailed(message));
        }
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.alive.lock().insert(pid);
        Ok(pid)
    }

    fn kill(&self, pid: u32, _signal: Signal) -> Result<(), ProcessError> {
        if !self.alive.lock().remove(&pid) {
            return Err(ProcessError::SignalFailed {
                pid,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such process"),
            });
        }
        Ok(())
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.alive.lock().contains(&pid)
    }

    fn self_pid(&self) -> u32 {
        std::process::id()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
