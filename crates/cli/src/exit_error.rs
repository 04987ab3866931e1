// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An error carrying the process exit code it should produce.
//!
//! Most command handlers just return `anyhow::Error` and let `main` map
//! the default failure code (distilled spec §6: exit 1). A handler that
//! needs a specific code — "runner already active" (6), "project disabled
//! or misconfigured" (7) — raises an [`ExitError`] instead, which `main`
//! downcasts out of the `anyhow` chain.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    pub fn resource_locked(message: impl Into<String>) -> Self {
        Self::new(6, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(7, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
