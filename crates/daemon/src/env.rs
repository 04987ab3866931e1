// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable and path resolution for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve the installation-wide state directory:
/// `STEROIDS_STATE_HOME` > `XDG_STATE_HOME/steroids` > `~/.local/state/steroids`.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("STEROIDS_STATE_HOME") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("steroids"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/steroids"))
}

/// Per-pid daemon log file under the state directory (distilled spec §6).
pub fn log_path(state_dir: &std::path::Path, pid: u32) -> PathBuf {
    state_dir.join("logs").join(format!("{pid}.log"))
}

/// Advisory lock file backing the per-project single-runner invariant
/// (SPEC_FULL.md §5). One lock file per normalized project path, keyed by
/// a short hash so the filename stays bounded regardless of path length.
pub fn runner_lock_path(state_dir: &std::path::Path, project_path: &str) -> PathBuf {
    state_dir
        .join("locks")
        .join(format!("{}.lock", project_hash(project_path)))
}

/// Default workspace root for a project's parallel-session clones, used
/// when `steroids.toml`'s `parallel.workspace_root` is unset (distilled
/// spec §4.7: `<root>/<projectHash>/ws-<workstreamId>`).
pub fn default_workspace_root(state_dir: &std::path::Path, project_path: &str) -> PathBuf {
    state_dir.join("workspaces").join(project_hash(project_path))
}

/// Short, stable hash of a normalized project path, used to keep lock and
/// workspace-root filenames bounded and filesystem-safe.
pub fn project_hash(project_path: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(project_path.as_bytes());
    let digest = hasher.finalize();
    hex_prefix(&digest, 16)
}

fn hex_prefix(bytes: &[u8], chars: usize) -> String {
    let mut out = String::with_capacity(chars);
    for byte in bytes {
        if out.len() >= chars {
            break;
        }
        out.push_str(&format!("{byte:02x}"));
    }
    out.truncate(chars);
    out
}

/// Heartbeat interval override, mirroring the teacher's timer-interval
/// environment escape hatch for tests and local debugging.
pub fn heartbeat_interval_override() -> Option<Duration> {
    std::env::var("STEROIDS_HEARTBEAT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// CLI binary invoked for both Coder and Reviewer roles (distilled spec
/// §9 AgentInvoker). Defaults to `claude`, the only provider CLI the
/// marker-line protocol has been validated against so far.
pub fn agent_command() -> String {
    std::env::var("STEROIDS_AGENT_COMMAND").unwrap_or_else(|_| "claude".to_string())
}

/// Optional hook command spawned on lifecycle events (distilled spec §9
/// HookDispatcher). Unset means no hooks fire, independent of
/// `STEROIDS_NO_HOOKS` which disables a configured command outright.
pub fn hook_command() -> Option<String> {
    std::env::var("STEROIDS_HOOK_COMMAND").ok()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
