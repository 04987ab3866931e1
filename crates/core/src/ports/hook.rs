// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `HookDispatcher`: fire-and-forget notification of external scripts/webhooks.

use async_trait::async_trait;
use serde_json::Value;

/// A hook event name (distilled spec §6): `task.created`, `task.updated`,
/// `task.completed`, `task.failed`, `section.completed`, `project.completed`,
/// `credit.exhausted`, `credit.resolved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEvent(pub String);

impl HookEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fire-and-forget dispatcher. Never fails the caller: `fire` has no
/// `Result` because hook failures are logged, never propagated (distilled
/// spec §7: "Hooks never fail the loop").
#[async_trait]
pub trait HookDispatcher: Send + Sync + 'static {
    async fn fire(&self, event: &HookEvent, payload: Value);
}
