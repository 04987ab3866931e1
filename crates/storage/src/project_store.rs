// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project Store: the durable, materialized state for a single registered
//! project's sections, tasks, runners, parallel sessions, workstreams,
//! disputes, credit incidents, and append-only activity/audit logs.
//!
//! CAS guards every status transition against [`is_legal_transition`] and
//! [`Task::check_invariants`] before the event is even appended to the WAL,
//! so the durable log never contains an illegal state.

use crate::checkpoint::{load_snapshot, CheckpointError, Checkpointer};
use crate::wal::{Wal, WalError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use steroids_core::{
    is_legal_transition, Actor, ActivityEvent, CreditIncident, CreditIncidentId, CreditResolution,
    Dispute, DisputeId, Invocation, InvocationId, ParallelSession, ParallelSessionId, Runner,
    RunnerId, RunnerStatus, Section, SectionId, SessionStatus, Task, TaskAudit, TaskAuditId,
    TaskId, TaskInvariantError, TaskStatus, Workstream, WorkstreamId, WorkstreamStatus,
};
use thiserror::Error;

pub const PROJECT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StoreEvent {
    SectionCreated { section: Section },
    SectionUpdated { section: Section },
    TaskCreated { task: Task },
    TaskTransitioned { task: Task, audit: TaskAudit },
    RunnerRegistered { runner: Runner },
    RunnerHeartbeat { id: RunnerId, heartbeat_at_ms: u64 },
    RunnerStatusChanged { id: RunnerId, status: RunnerStatus },
    RunnerRemoved { id: RunnerId },
    ParallelSessionCreated { session: ParallelSession },
    ParallelSessionStatusChanged { id: ParallelSessionId, status: SessionStatus, at_ms: u64 },
    WorkstreamCreated { workstream: Workstream },
    WorkstreamUpdated { workstream: Workstream },
    DisputeOpened { dispute: Dispute },
    DisputeResolved { dispute: Dispute },
    CreditIncidentOpened { incident: CreditIncident },
    CreditIncidentResolved { incident: CreditIncident },
    ActivityAppended { event: ActivityEvent },
    InvocationRecorded { invocation: Invocation },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectState {
    pub sections: HashMap<SectionId, Section>,
    pub tasks: HashMap<TaskId, Task>,
    pub runners: HashMap<RunnerId, Runner>,
    pub parallel_sessions: HashMap<ParallelSessionId, ParallelSession>,
    pub workstreams: HashMap<WorkstreamId, Workstream>,
    pub disputes: HashMap<DisputeId, Dispute>,
    pub credit_incidents: HashMap<CreditIncidentId, CreditIncident>,
    pub audit_log: Vec<TaskAudit>,
    pub activity_log: Vec<ActivityEvent>,
    pub invocations: HashMap<InvocationId, Invocation>,
}

impl ProjectState {
    fn apply(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::SectionCreated { section } | StoreEvent::SectionUpdated { section } => {
                self.sections.insert(section.id.clone(), section.clone());
            }
            StoreEvent::TaskCreated { task } => {
                self.tasks.insert(task.id.clone(), task.clone());
            }
            StoreEvent::TaskTransitioned { task, audit } => {
                self.tasks.insert(task.id.clone(), task.clone());
                self.audit_log.push(audit.clone());
            }
            StoreEvent::RunnerRegistered { runner } => {
                self.runners.insert(runner.id.clone(), runner.clone());
            }
            StoreEvent::RunnerHeartbeat { id, heartbeat_at_ms } => {
                if let Some(runner) = self.runners.get_mut(id) {
                    runner.heartbeat_at_ms = *heartbeat_at_ms;
                }
            }
            StoreEvent::RunnerStatusChanged { id, status } => {
                if let Some(runner) = self.runners.get_mut(id) {
                    runner.status = *status;
                }
            }
            StoreEvent::RunnerRemoved { id } => {
                self.runners.remove(id);
            }
            StoreEvent::ParallelSessionCreated { session } => {
                self.parallel_sessions.insert(session.id.clone(), session.clone());
            }
            StoreEvent::ParallelSessionStatusChanged { id, status, at_ms } => {
                if let Some(session) = self.parallel_sessions.get_mut(id) {
                    session.status = *status;
                    if status.is_terminal() {
                        session.completed_at_ms = Some(*at_ms);
                    }
                }
            }
            StoreEvent::WorkstreamCreated { workstream } | StoreEvent::WorkstreamUpdated { workstream } => {
                self.workstreams.insert(workstream.id.clone(), workstream.clone());
            }
            StoreEvent::DisputeOpened { dispute } | StoreEvent::DisputeResolved { dispute } => {
                self.disputes.insert(dispute.id.clone(), dispute.clone());
            }
            StoreEvent::CreditIncidentOpened { incident }
            | StoreEvent::CreditIncidentResolved { incident } => {
                self.credit_incidents.insert(incident.id.clone(), incident.clone());
            }
            StoreEvent::ActivityAppended { event } => {
                self.activity_log.push(event.clone());
            }
            StoreEvent::InvocationRecorded { invocation } => {
                self.invocations.insert(invocation.id.clone(), invocation.clone());
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ProjectStoreError {
    #[error(transparent)]
    Wal(#[from] WalError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("runner not found: {0}")]
    RunnerNotFound(RunnerId),
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: TaskStatus, to: TaskStatus },
    #[error(transparent)]
    Invariant(#[from] TaskInvariantError),
}

pub struct ProjectStore {
    wal: Wal<StoreEvent>,
    state: ProjectState,
    checkpointer: Checkpointer<ProjectState>,
    next_seq: u64,
}

impl ProjectStore {
    pub fn open(dir: &Path) -> Result<Self, ProjectStoreError> {
        std::fs::create_dir_all(dir).map_err(WalError::Io)?;
        let snapshot_path = dir.join("store.snapshot.zst");
        let wal_path = dir.join("store.wal");

        let snapshot = load_snapshot::<ProjectState>(&snapshot_path)?;
        let (mut state, processed_seq) = match snapshot {
            Some(s) => (s.state, s.seq),
            None => (ProjectState::default(), 0),
        };

        let mut wal: Wal<StoreEvent> = Wal::open(&wal_path, processed_seq)?;
        for entry in wal.entries_after(processed_seq)? {
            state.apply(&entry.event);
            wal.mark_processed(entry.seq);
        }

        let next_seq = next_seq_after(&state);
        let checkpointer = Checkpointer::new(snapshot_path, PROJECT_SNAPSHOT_VERSION);

        Ok(Self {
            wal,
            state,
            checkpointer,
            next_seq,
        })
    }

    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    fn commit(&mut self, event: StoreEvent) -> Result<(), ProjectStoreError> {
        let seq = self.wal.append(&event)?;
        self.wal.flush()?;
        self.state.apply(&event);
        self.wal.mark_processed(seq);
        Ok(())
    }

    pub fn create_section(&mut self, section: Section) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::SectionCreated { section })
    }

    pub fn update_section(&mut self, section: Section) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::SectionUpdated { section })
    }

    pub fn create_task(&mut self, task: Task) -> Result<(), ProjectStoreError> {
        task.check_invariants()?;
        self.commit(StoreEvent::TaskCreated { task })
    }

    /// CAS-guarded transition: the caller supplies the fully-updated `Task`
    /// (new status plus any other mutated fields) and an `actor`. The
    /// transition is validated against [`is_legal_transition`] and
    /// [`Task::check_invariants`] before anything is written.
    pub fn transition_task(
        &mut self,
        mut task: Task,
        actor: Actor,
        notes: Option<String>,
        commit_sha: Option<String>,
        created_at_ms: u64,
    ) -> Result<(), ProjectStoreError> {
        let current = self
            .state
            .tasks
            .get(&task.id)
            .ok_or_else(|| ProjectStoreError::TaskNotFound(task.id.clone()))?;

        if !is_legal_transition(current.status, task.status) {
            return Err(ProjectStoreError::IllegalTransition {
                from: current.status,
                to: task.status,
            });
        }
        task.check_invariants()?;

        let seq = self.next_seq;
        self.next_seq += 1;

        let audit = TaskAudit {
            id: TaskAuditId::default(),
            task_id: task.id.clone(),
            from_status: Some(current.status),
            to_status: task.status,
            actor,
            notes,
            commit_sha,
            created_at_ms,
            seq,
        };

        self.commit(StoreEvent::TaskTransitioned { task, audit })
    }

    /// Write an audit-only update to a task without going through the
    /// [`is_legal_transition`] CAS guard: used for `reset-rejections` (which
    /// zeroes `rejection_count` without moving the task out of its current
    /// status) and the reviewer's `ignoredAfterFailed` boundary (a reject
    /// arriving for a task already `failed` stays a no-op but still needs a
    /// durable trail). `task` must already carry the status it currently
    /// has; only `check_invariants` is enforced.
    pub fn record_task_note(
        &mut self,
        task: Task,
        actor: Actor,
        notes: Option<String>,
        created_at_ms: u64,
    ) -> Result<(), ProjectStoreError> {
        if !self.state.tasks.contains_key(&task.id) {
            return Err(ProjectStoreError::TaskNotFound(task.id.clone()));
        }
        task.check_invariants()?;

        let seq = self.next_seq;
        self.next_seq += 1;

        let audit = TaskAudit {
            id: TaskAuditId::default(),
            task_id: task.id.clone(),
            from_status: Some(task.status),
            to_status: task.status,
            actor,
            notes,
            commit_sha: None,
            created_at_ms,
            seq,
        };

        self.commit(StoreEvent::TaskTransitioned { task, audit })
    }

    pub fn register_runner(&mut self, runner: Runner) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::RunnerRegistered { runner })
    }

    pub fn heartbeat_runner(
        &mut self,
        id: RunnerId,
        heartbeat_at_ms: u64,
    ) -> Result<(), ProjectStoreError> {
        if !self.state.runners.contains_key(&id) {
            return Err(ProjectStoreError::RunnerNotFound(id));
        }
        self.commit(StoreEvent::RunnerHeartbeat { id, heartbeat_at_ms })
    }

    pub fn set_runner_status(
        &mut self,
        id: RunnerId,
        status: RunnerStatus,
    ) -> Result<(), ProjectStoreError> {
        if !self.state.runners.contains_key(&id) {
            return Err(ProjectStoreError::RunnerNotFound(id));
        }
        self.commit(StoreEvent::RunnerStatusChanged { id, status })
    }

    pub fn remove_runner(&mut self, id: RunnerId) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::RunnerRemoved { id })
    }

    pub fn create_parallel_session(
        &mut self,
        session: ParallelSession,
    ) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::ParallelSessionCreated { session })
    }

    pub fn set_session_status(
        &mut self,
        id: ParallelSessionId,
        status: SessionStatus,
        at_ms: u64,
    ) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::ParallelSessionStatusChanged { id, status, at_ms })
    }

    pub fn create_workstream(&mut self, workstream: Workstream) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::WorkstreamCreated { workstream })
    }

    pub fn update_workstream(&mut self, workstream: Workstream) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::WorkstreamUpdated { workstream })
    }

    pub fn open_dispute(&mut self, dispute: Dispute) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::DisputeOpened { dispute })
    }

    pub fn resolve_dispute(&mut self, dispute: Dispute) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::DisputeResolved { dispute })
    }

    pub fn open_credit_incident(
        &mut self,
        incident: CreditIncident,
    ) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::CreditIncidentOpened { incident })
    }

    pub fn resolve_credit_incident(
        &mut self,
        incident: CreditIncident,
    ) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::CreditIncidentResolved { incident })
    }

    pub fn append_activity(&mut self, mut event: ActivityEvent) -> Result<(), ProjectStoreError> {
        event.seq = self.next_seq;
        self.next_seq += 1;
        self.commit(StoreEvent::ActivityAppended { event })
    }

    pub fn record_invocation(&mut self, invocation: Invocation) -> Result<(), ProjectStoreError> {
        self.commit(StoreEvent::InvocationRecorded { invocation })
    }

    pub fn checkpoint(&mut self) -> Result<(), ProjectStoreError> {
        let seq = self.wal.processed_seq();
        self.checkpointer.checkpoint_sync(seq, &self.state)?;
        self.wal.truncate_before(seq)?;
        Ok(())
    }
}

/// Recompute the next monotonic `seq` to assign to audit rows and activity
/// events after replaying the WAL/snapshot, so reopening a store never
/// reissues a `seq` already seen by a consumer.
fn next_seq_after(state: &ProjectState) -> u64 {
    let max_audit = state.audit_log.iter().map(|a| a.seq).max().unwrap_or(0);
    let max_activity = state.activity_log.iter().map(|a| a.seq).max().unwrap_or(0);
    max_audit.max(max_activity) + 1
}

#[cfg(test)]
#[path = "project_store_tests.rs"]
mod tests;
