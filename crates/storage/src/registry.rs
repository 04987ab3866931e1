// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global Registry store: the set of projects known to the installation,
//! independent of any single project's own Project Store.
//!
//! Durability follows the same WAL + snapshot + background checkpoint
//! scheme as the Project Store, parameterized over [`RegistryEvent`] and
//! [`RegistryState`] instead of task-domain types.

use crate::checkpoint::{load_snapshot, CheckpointError, Checkpointer};
use crate::wal::{Wal, WalError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use steroids_core::Project;
use thiserror::Error;

pub const REGISTRY_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegistryEvent {
    ProjectRegistered { project: Project },
    ProjectEnabled { path: String, at_ms: u64 },
    ProjectDisabled { path: String, at_ms: u64 },
    ProjectSeen { path: String, at_ms: u64 },
    ProjectStatsUpdated { path: String, stats: steroids_core::ProjectStats },
    ProjectRemoved { path: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryState {
    pub projects: BTreeMap<String, Project>,
}

impl RegistryState {
    fn apply(&mut self, event: &RegistryEvent) {
        match event {
            RegistryEvent::ProjectRegistered { project } => {
                self.projects.insert(project.path.clone(), project.clone());
            }
            RegistryEvent::ProjectEnabled { path, at_ms } => {
                if let Some(project) = self.projects.get_mut(path) {
                    project.enabled = true;
                    project.last_seen_at_ms = *at_ms;
                }
            }
            RegistryEvent::ProjectDisabled { path, at_ms } => {
                if let Some(project) = self.projects.get_mut(path) {
                    project.enabled = false;
                    project.last_seen_at_ms = *at_ms;
                }
            }
            RegistryEvent::ProjectSeen { path, at_ms } => {
                if let Some(project) = self.projects.get_mut(path) {
                    project.last_seen_at_ms = *at_ms;
                }
            }
            RegistryEvent::ProjectStatsUpdated { path, stats } => {
                if let Some(project) = self.projects.get_mut(path) {
                    project.stats = Some(*stats);
                }
            }
            RegistryEvent::ProjectRemoved { path } => {
                self.projects.remove(path);
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryStoreError {
    #[error(transparent)]
    Wal(#[from] WalError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error("project already registered: {0}")]
    AlreadyRegistered(String),
    #[error("project not found: {0}")]
    NotFound(String),
}

/// Owns the durability machinery for the Global Registry: one WAL, one
/// background checkpointer, and the in-memory materialized state.
pub struct RegistryStore {
    wal: Wal<RegistryEvent>,
    state: RegistryState,
    checkpointer: Checkpointer<RegistryState>,
}

impl RegistryStore {
    pub fn open(dir: &Path) -> Result<Self, RegistryStoreError> {
        std::fs::create_dir_all(dir).map_err(WalError::Io)?;
        let snapshot_path = dir.join("registry.snapshot.zst");
        let wal_path = dir.join("registry.wal");

        let snapshot = load_snapshot::<RegistryState>(&snapshot_path)?;
        let (mut state, processed_seq) = match snapshot {
            Some(s) => (s.state, s.seq),
            None => (RegistryState::default(), 0),
        };

        let mut wal: Wal<RegistryEvent> = Wal::open(&wal_path, processed_seq)?;
        for entry in wal.entries_after(processed_seq)? {
            state.apply(&entry.event);
            wal.mark_processed(entry.seq);
        }

        let checkpointer = Checkpointer::new(snapshot_path, REGISTRY_SNAPSHOT_VERSION);

        Ok(Self {
            wal,
            state,
            checkpointer,
        })
    }

    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    fn commit(&mut self, event: RegistryEvent) -> Result<(), RegistryStoreError> {
        let seq = self.wal.append(&event)?;
        self.wal.flush()?;
        self.state.apply(&event);
        self.wal.mark_processed(seq);
        Ok(())
    }

    pub fn register_project(&mut self, project: Project) -> Result<(), RegistryStoreError> {
        if self.state.projects.contains_key(&project.path) {
            return Err(RegistryStoreError::AlreadyRegistered(project.path));
        }
        self.commit(RegistryEvent::ProjectRegistered { project })
    }

    pub fn set_enabled(
        &mut self,
        path: &str,
        enabled: bool,
        at_ms: u64,
    ) -> Result<(), RegistryStoreError> {
        if !self.state.projects.contains_key(path) {
            return Err(RegistryStoreError::NotFound(path.to_string()));
        }
        let event = if enabled {
            RegistryEvent::ProjectEnabled {
                path: path.to_string(),
                at_ms,
            }
        } else {
            RegistryEvent::ProjectDisabled {
                path: path.to_string(),
                at_ms,
            }
        };
        self.commit(event)
    }

    pub fn mark_seen(&mut self, path: &str, at_ms: u64) -> Result<(), RegistryStoreError> {
        if !self.state.projects.contains_key(path) {
            return Err(RegistryStoreError::NotFound(path.to_string()));
        }
        self.commit(RegistryEvent::ProjectSeen {
            path: path.to_string(),
            at_ms,
        })
    }

    pub fn update_stats(
        &mut self,
        path: &str,
        stats: steroids_core::ProjectStats,
    ) -> Result<(), RegistryStoreError> {
        if !self.state.projects.contains_key(path) {
            return Err(RegistryStoreError::NotFound(path.to_string()));
        }
        self.commit(RegistryEvent::ProjectStatsUpdated {
            path: path.to_string(),
            stats,
        })
    }

    pub fn remove_project(&mut self, path: &str) -> Result<(), RegistryStoreError> {
        if !self.state.projects.contains_key(path) {
            return Err(RegistryStoreError::NotFound(path.to_string()));
        }
        self.commit(RegistryEvent::ProjectRemoved {
            path: path.to_string(),
        })
    }

    /// Checkpoint synchronously and truncate the WAL up to the checkpointed
    /// sequence. Called on graceful shutdown and periodically by the Wakeup
    /// Controller.
    pub fn checkpoint(&mut self) -> Result<(), RegistryStoreError> {
        let seq = self.wal.processed_seq();
        self.checkpointer.checkpoint_sync(seq, &self.state)?;
        self.wal.truncate_before(seq)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
