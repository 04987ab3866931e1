// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `std::process`-backed `ProcessControl`.
//!
//! Signal delivery shells out to the `kill` binary rather than linking a
//! signal-handling crate, matching the rest of this crate's preference for
//! subprocess-based system interaction over direct syscalls.

use std::path::Path;
use std::process::{Command, Stdio};
use steroids_core::ports::process::{ProcessControl, ProcessError, Signal};

#[derive(Clone, Copy, Default)]
pub struct StdProcessControl;

impl StdProcessControl {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessControl for StdProcessControl {
    fn spawn_detached(&self, cmd: &str, args: &[String], cwd: &Path) -> Result<u32, ProcessError> {
        let child = Command::new(cmd)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ProcessError::SpawnFailed(e.to_string()))?;
        Ok(child.id())
    }

    fn kill(&self, pid: u32, signal: Signal) -> Result<(), ProcessError> {
        let flag = match signal {
            Signal::Term => "-TERM",
            Signal::Kill => "-KILL",
        };
        let status = Command::new("kill")
            .arg(flag)
            .arg(pid.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| ProcessError::SignalFailed { pid, source: e })?;
        if !status.success() {
            return Err(ProcessError::SignalFailed {
                pid,
                source: std::io::Error::new(std::io::ErrorKind::Other, "kill exited non-zero"),
            });
        }
        Ok(())
    }

    fn is_alive(&self, pid: u32) -> bool {
        Command::new("kill")
            .arg("-0")
            .arg(pid.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn self_pid(&self) -> u32 {
        std::process::id()
    }
}

#[cfg(test)]
#[path = "real_tests.rs"]
mod tests;
