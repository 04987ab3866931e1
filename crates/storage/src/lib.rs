// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! steroids-storage: write-ahead-logged, snapshot-checkpointed durability
//! for the Global Registry and each project's Project Store.

pub mod checkpoint;
pub mod migration;
pub mod project_store;
pub mod registry;
pub mod snapshot;
pub mod wal;

pub use checkpoint::{
    load_snapshot, CheckpointError, CheckpointHandle, CheckpointResult, CheckpointWriter,
    Checkpointer, FsCheckpointWriter,
};
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use project_store::{
    ProjectState, ProjectStore, ProjectStoreError, StoreEvent, PROJECT_SNAPSHOT_VERSION,
};
pub use registry::{
    RegistryEvent, RegistryState, RegistryStore, RegistryStoreError, REGISTRY_SNAPSHOT_VERSION,
};
pub use snapshot::Snapshot;
pub use wal::{Wal, WalEntry, WalError};
