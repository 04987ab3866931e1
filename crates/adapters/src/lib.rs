// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the concrete implementations of the ports
//! declared in `steroids_core::ports`.

pub mod agent_invoker;
pub mod filesystem;
pub mod git;
pub mod hook;
pub mod process;
pub mod subprocess;

pub use agent_invoker::CliAgentInvoker;
pub use filesystem::StdFilesystem;
pub use git::CliGitPort;
pub use hook::ProcessHookDispatcher;
pub use process::StdProcessControl;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use agent_invoker::{AgentCall, FakeAgentInvoker};
#[cfg(any(test, feature = "test-support"))]
pub use filesystem::FakeFilesystem;
#[cfg(any(test, feature = "test-support"))]
pub use git::FakeGitPort;
#[cfg(any(test, feature = "test-support"))]
pub use hook::{FakeHookDispatcher, HookCall};
#[cfg(any(test, feature = "test-support"))]
pub use process::FakeProcessControl;
