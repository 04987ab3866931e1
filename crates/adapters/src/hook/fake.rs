// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake `HookDispatcher` that records fired events for assertions.
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use steroids_core::ports::hook::{HookDispatcher, HookEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct HookCall {
    pub event: String,
    pub payload: Value,
}

#[derive(Clone, Default)]
pub struct FakeHookDispatcher {
    calls: Arc<Mutex<Vec<HookCall>>>,
}

impl FakeHookDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl HookDispatcher for FakeHookDispatcher {
    async fn fire(&self, event: &HookEvent, payload: Value) {
        self.calls.lock().push(HookCall {
            event: event.to_string(),
            payload,
        });
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
