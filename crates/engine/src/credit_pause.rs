// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credit-exhaustion pause protocol (distilled spec §4.9): when an agent
//! invocation reports it ran out of provider credit, the loop opens (or
//! reuses) a [`CreditIncident`] and blocks the current task instead of
//! burning further invocations against the same exhausted provider/model.

use crate::error::EngineError;
use std::time::Duration;
use steroids_core::credit::sanitize_message;
use steroids_core::ports::agent_invoker::CreditExhaustion;
use steroids_core::ports::hook::{HookDispatcher, HookEvent};
use steroids_core::{
    AiRoleConfig, Clock, CreditIncident, CreditIncidentId, CreditResolution, IdGen, RunnerId,
};
use steroids_storage::ProjectStore;

/// Slice length the poll loop sleeps between `shouldStop`/config checks
/// (distilled spec §4.9 step 4.a).
const POLL_SLICE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditPauseOutcome {
    /// A new or still-unresolved incident is blocking this provider/model.
    Paused,
    /// An operator already resolved the matching incident; the caller may
    /// retry the invocation on its next iteration.
    Resumed,
}

/// Outcome of [`poll_until_resolved`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseResolution {
    ConfigChanged,
    Stopped,
    TimedOut,
}

/// Open (or confirm) the incident for this exhaustion and report whether the
/// loop should keep pausing or may resume.
///
/// Dedup is on `(provider, model, role)` (distilled spec §4.9 step 1):
/// a second exhaustion for the same triple while one incident is still
/// unresolved never opens a duplicate row.
pub fn pause_for_credit_exhaustion(
    store: &mut ProjectStore,
    clock: &impl Clock,
    id_gen: &impl IdGen,
    exhaustion: &CreditExhaustion,
    runner_id: RunnerId,
) -> Result<CreditPauseOutcome, EngineError> {
    let existing = store
        .state()
        .credit_incidents
        .values()
        .find(|incident| {
            incident.dedup_key()
                == (
                    exhaustion.provider.as_str(),
                    exhaustion.model.as_str(),
                    exhaustion.role,
                )
        })
        .cloned();

    match existing {
        Some(incident) if incident.is_unresolved() => Ok(CreditPauseOutcome::Paused),
        Some(_) => Ok(CreditPauseOutcome::Resumed),
        None => {
            let incident = CreditIncident {
                id: CreditIncidentId::new(id_gen.next()),
                provider: exhaustion.provider.clone(),
                model: exhaustion.model.clone(),
                role: exhaustion.role,
                message: sanitize_message(&exhaustion.message),
                runner_id,
                opened_at_ms: clock.epoch_ms(),
                resolved_at_ms: None,
                resolution: None,
            };
            store.open_credit_incident(incident)?;
            Ok(CreditPauseOutcome::Paused)
        }
    }
}

/// Resolve an unresolved incident, e.g. after an operator updates
/// provider config or dismisses it from the CLI.
pub fn resolve_credit_incident(
    store: &mut ProjectStore,
    clock: &impl Clock,
    incident_id: &CreditIncidentId,
    resolution: CreditResolution,
) -> Result<(), EngineError> {
    let Some(mut incident) = store.state().credit_incidents.get(incident_id).cloned() else {
        return Err(EngineError::IntegrityViolation(format!(
            "no such credit incident: {incident_id}"
        )));
    };
    incident.resolved_at_ms = Some(clock.epoch_ms());
    incident.resolution = Some(resolution);
    store.resolve_credit_incident(incident)?;
    Ok(())
}

/// Step 4 of the pause protocol: poll in `POLL_SLICE` chunks up to
/// `poll_max_wait_ms`, checking `should_stop`, refreshing the runner's
/// heartbeat, and re-reading the role's configured provider/model on every
/// slice.
///
/// Returns as soon as the configured provider or model for `role` differs
/// from the pair recorded on the incident, or the caller asked to stop, or
/// the max wait elapses. The heartbeat is written straight to `store` rather
/// than through a caller-supplied closure, since `store` is already held
/// mutably for the duration of the poll.
pub async fn poll_until_resolved(
    store: &mut ProjectStore,
    clock: &impl Clock,
    incident_id: &CreditIncidentId,
    poll_max_wait_ms: u64,
    runner_id: &RunnerId,
    should_stop: impl Fn() -> bool,
    read_current_role_config: impl Fn() -> AiRoleConfig,
    hooks: &impl HookDispatcher,
) -> Result<PauseResolution, EngineError> {
    let incident = store
        .state()
        .credit_incidents
        .get(incident_id)
        .cloned()
        .ok_or_else(|| EngineError::IntegrityViolation(format!("no such credit incident: {incident_id}")))?;

    let mut waited_ms = 0u64;
    loop {
        if should_stop() {
            resolve_credit_incident(store, clock, incident_id, CreditResolution::Dismissed)?;
            return Ok(PauseResolution::Stopped);
        }
        if waited_ms >= poll_max_wait_ms {
            return Ok(PauseResolution::TimedOut);
        }

        tokio::time::sleep(POLL_SLICE).await;
        waited_ms += POLL_SLICE.as_millis() as u64;
        if store.state().runners.contains_key(runner_id) {
            store.heartbeat_runner(runner_id.clone(), clock.epoch_ms())?;
        }

        let current = read_current_role_config();
        if current.provider != incident.provider || current.model != incident.model {
            resolve_credit_incident(store, clock, incident_id, CreditResolution::ConfigChanged)?;
            hooks
                .fire(
                    &HookEvent::new("credit.resolved"),
                    serde_json::json!({ "incident_id": incident_id.to_string() }),
                )
                .await;
            return Ok(PauseResolution::ConfigChanged);
        }
    }
}

#[cfg(test)]
#[path = "credit_pause_tests.rs"]
mod tests;
