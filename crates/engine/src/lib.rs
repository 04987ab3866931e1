// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Orchestration engine: the Task Selector, Orchestrator Loop, Parallel
//! Session manager, Credit-Exhaustion Pause protocol, and Stuck-Task
//! Recovery heuristics that drive one project's coder/reviewer cycle.

pub mod credit_pause;
pub mod error;
pub mod orchestrator;
pub mod parallel;
pub mod selector;
pub mod stuck_recovery;

pub use credit_pause::{pause_for_credit_exhaustion, poll_until_resolved, CreditPauseOutcome, PauseResolution};
pub use error::EngineError;
pub use orchestrator::{LoopStep, Orchestrator};
pub use parallel::{auto_merge, create_session, partition_sections, MergeReport};
pub use selector::{select_batch, select_next, SelectFilter};
pub use stuck_recovery::{apply_recovery, find_recoverable, RecoveryAction};
