// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-level error taxonomy (distilled spec §7).

use steroids_core::ports::agent_invoker::AgentInvokerError;
use steroids_core::ports::git::GitError;
use steroids_storage::ProjectStoreError;
use thiserror::Error;

/// Errors the Orchestrator Loop and its supporting subsystems can surface.
///
/// `Transient` and `IntegrityViolation` are the two variants the loop
/// pattern-matches on to decide retry-vs-surface: a transient failure is
/// logged and retried on the next iteration, an integrity violation stops
/// the loop so a human can intervene.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] ProjectStoreError),
    #[error(transparent)]
    Agent(#[from] AgentInvokerError),
    #[error(transparent)]
    Git(#[from] GitError),
    #[error("transient failure, will retry: {0}")]
    Transient(String),
    #[error("integrity violation, loop stopped: {0}")]
    IntegrityViolation(String),
}

impl EngineError {
    /// Whether the Orchestrator Loop should keep running after this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Transient(_) | EngineError::Agent(_) => true,
            EngineError::Store(_) | EngineError::Git(_) | EngineError::IntegrityViolation(_) => false,
        }
    }
}
