// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hook dispatcher that spawns a configured command for each event.

use async_trait::async_trait;
use serde_json::Value;
use steroids_core::ports::hook::{HookDispatcher, HookEvent};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::subprocess::HOOK_TIMEOUT;

/// Spawns `command <event-name>` with the event payload written to the
/// child's stdin as JSON. Respects `STEROIDS_NO_HOOKS`, which disables
/// dispatch entirely (used by tests and one-off CLI invocations).
#[derive(Clone)]
pub struct ProcessHookDispatcher {
    command: Option<String>,
}

impl ProcessHookDispatcher {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    fn disabled() -> bool {
        std::env::var_os("STEROIDS_NO_HOOKS").is_some()
    }
}

#[async_trait]
impl HookDispatcher for ProcessHookDispatcher {
    async fn fire(&self, event: &HookEvent, payload: Value) {
        if Self::disabled() {
            return;
        }
        let Some(command) = self.command.clone() else {
            return;
        };
        let event_name = event.to_string();
        let body = payload.to_string();

        tokio::spawn(async move {
            let mut child = match Command::new(&command)
                .arg(&event_name)
                .stdin(std::process::Stdio::piped())
                .stdout(std::process::Stdio::null())
                .stderr(std::process::Stdio::piped())
                .spawn()
            {
                Ok(child) => child,
                Err(e) => {
                    tracing::warn!(hook = %event_name, error = %e, "failed to spawn hook command");
                    return;
                }
            };

            if let Some(mut stdin) = child.stdin.take() {
                let _ = stdin.write_all(body.as_bytes()).await;
            }

            match tokio::time::timeout(HOOK_TIMEOUT, child.wait_with_output()).await {
                Ok(Ok(output)) if !output.status.success() => {
                    tracing::warn!(
                        hook = %event_name,
                        stderr = %String::from_utf8_lossy(&output.stderr),
                        "hook command exited with failure"
                    );
                }
                Ok(Err(e)) => {
                    tracing::warn!(hook = %event_name, error = %e, "hook command failed");
                }
                Err(_elapsed) => {
                    tracing::warn!(hook = %event_name, "hook command timed out");
                }
                Ok(Ok(_)) => {}
            }
        });
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
