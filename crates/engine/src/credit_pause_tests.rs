// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use steroids_core::ports::agent_invoker::CreditExhaustion;
use steroids_core::{FakeClock, Role, SequentialIdGen};
use tempfile::TempDir;

fn exhaustion() -> CreditExhaustion {
    CreditExhaustion {
        provider: "anthropic".to_string(),
        model: "default".to_string(),
        role: Role::Coder,
        message: "usage limit reached".to_string(),
    }
}

#[test]
fn first_exhaustion_opens_an_incident_and_pauses() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    let clock = FakeClock::new(1_000);

    let outcome =
        pause_for_credit_exhaustion(&mut store, &clock, &SequentialIdGen::new("ci"), &exhaustion(), RunnerId::new("r1")).unwrap();

    assert_eq!(outcome, CreditPauseOutcome::Paused);
    assert_eq!(store.state().credit_incidents.len(), 1);
}

#[test]
fn repeated_exhaustion_for_same_provider_model_role_does_not_duplicate() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    let clock = FakeClock::new(1_000);

    pause_for_credit_exhaustion(&mut store, &clock, &SequentialIdGen::new("ci"), &exhaustion(), RunnerId::new("r1")).unwrap();
    pause_for_credit_exhaustion(&mut store, &clock, &SequentialIdGen::new("ci"), &exhaustion(), RunnerId::new("r1")).unwrap();

    assert_eq!(store.state().credit_incidents.len(), 1);
}

#[test]
fn resolved_incident_allows_resume() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    let clock = FakeClock::new(1_000);

    pause_for_credit_exhaustion(&mut store, &clock, &SequentialIdGen::new("ci"), &exhaustion(), RunnerId::new("r1")).unwrap();
    let incident_id = store.state().credit_incidents.keys().next().unwrap().clone();
    resolve_credit_incident(
        &mut store,
        &clock,
        &incident_id,
        CreditResolution::ConfigChanged,
    )
    .unwrap();

    let outcome =
        pause_for_credit_exhaustion(&mut store, &clock, &SequentialIdGen::new("ci"), &exhaustion(), RunnerId::new("r1")).unwrap();
    assert_eq!(outcome, CreditPauseOutcome::Resumed);
}

#[tokio::test]
async fn poll_stops_immediately_when_should_stop_is_already_true() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    let clock = FakeClock::new(1_000);
    pause_for_credit_exhaustion(&mut store, &clock, &SequentialIdGen::new("ci"), &exhaustion(), RunnerId::new("r1")).unwrap();
    let incident_id = store.state().credit_incidents.keys().next().unwrap().clone();
    let hooks = steroids_adapters::FakeHookDispatcher::new();

    let resolution = poll_until_resolved(
        &mut store,
        &clock,
        &incident_id,
        60_000,
        &RunnerId::new("r1"),
        || true,
        || steroids_core::AiRoleConfig {
            provider: "anthropic".to_string(),
            model: "default".to_string(),
        },
        &hooks,
    )
    .await
    .unwrap();

    assert_eq!(resolution, PauseResolution::Stopped);
    assert!(store.state().credit_incidents[&incident_id].resolved_at_ms.is_some());
}

#[tokio::test]
async fn poll_times_out_without_resolving_when_max_wait_already_elapsed() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    let clock = FakeClock::new(1_000);
    pause_for_credit_exhaustion(&mut store, &clock, &SequentialIdGen::new("ci"), &exhaustion(), RunnerId::new("r1")).unwrap();
    let incident_id = store.state().credit_incidents.keys().next().unwrap().clone();
    let hooks = steroids_adapters::FakeHookDispatcher::new();

    let resolution = poll_until_resolved(
        &mut store,
        &clock,
        &incident_id,
        0,
        &RunnerId::new("r1"),
        || false,
        || steroids_core::AiRoleConfig {
            provider: "anthropic".to_string(),
            model: "default".to_string(),
        },
        &hooks,
    )
    .await
    .unwrap();

    assert_eq!(resolution, PauseResolution::TimedOut);
    assert!(store.state().credit_incidents[&incident_id].resolved_at_ms.is_none());
}
