// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use steroids_adapters::{FakeAgentInvoker, FakeGitPort, FakeHookDispatcher};
use steroids_core::ports::agent_invoker::{CoderResult, CreditExhaustion, ReviewerResult};
use steroids_core::{FakeClock, SequentialIdGen, Task, TaskId, TaskStatus};
use tempfile::TempDir;

fn sample_task(id: &str, status: TaskStatus) -> Task {
    Task {
        id: TaskId::new(id),
        title: "do the thing".to_string(),
        section_id: None,
        status,
        rejection_count: 0,
        source_file: None,
        file_path: None,
        file_line: None,
        file_commit_sha: None,
        file_content_hash: None,
        created_at_ms: 1_000,
        updated_at_ms: 1_000,
    }
}

fn make_orchestrator(
    agent: FakeAgentInvoker,
    git: FakeGitPort,
    hooks: FakeHookDispatcher,
) -> Orchestrator<FakeAgentInvoker, FakeGitPort, FakeHookDispatcher, FakeClock, SequentialIdGen> {
    Orchestrator {
        agent_invoker: agent,
        git,
        hooks,
        clock: FakeClock::new(5_000),
        id_gen: SequentialIdGen::new("inv"),
        runner_id: RunnerId::new("r1"),
        project_path: std::path::PathBuf::from("/srv/app"),
        git_remote: "origin".to_string(),
        git_branch: "main".to_string(),
        backoff: Duration::from_millis(0),
        config_path: std::path::PathBuf::from("/srv/app/steroids.toml"),
        credit_poll_max_wait_ms: 0,
        batch_mode: false,
        max_batch_size: 10,
        stop_requested: Arc::new(AtomicBool::new(false)),
    }
}

#[tokio::test]
async fn starting_a_pending_task_transitions_to_in_progress_and_invokes_coder() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    store.create_task(sample_task("t1", TaskStatus::Pending)).unwrap();

    let agent = FakeAgentInvoker::new();
    let orchestrator = make_orchestrator(agent.clone(), FakeGitPort::new(), FakeHookDispatcher::new());

    let step = orchestrator.step(&mut store, &SelectFilter::default()).await.unwrap();
    assert_eq!(step, LoopStep::Advanced { task_id: "t1".to_string() });
    assert_eq!(store.state().tasks[&TaskId::new("t1")].status, TaskStatus::InProgress);
    assert_eq!(agent.calls().len(), 1);
    assert_eq!(store.state().invocations.len(), 1);
}

#[tokio::test]
async fn reviewer_fallback_approve_transitions_to_completed_and_pushes() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    store.create_task(sample_task("t1", TaskStatus::Pending)).unwrap();
    let mut under_review = store.state().tasks[&TaskId::new("t1")].clone();
    under_review.status = TaskStatus::InProgress;
    store
        .transition_task(under_review.clone(), Actor::Orchestrator, None, None, 1_000)
        .unwrap();
    under_review.status = TaskStatus::Review;
    store
        .transition_task(under_review, Actor::Coder, None, None, 1_100)
        .unwrap();

    let agent = FakeAgentInvoker::new();
    agent.push_reviewer_result(ReviewerResult {
        store_mutated: false,
        decision: Some(steroids_core::ports::agent_invoker::ReviewerDecision::Approve),
        ..Default::default()
    });
    let git = FakeGitPort::new();
    git.set_head(std::path::Path::new("/srv/app"), "abc123");
    let orchestrator = make_orchestrator(agent, git.clone(), FakeHookDispatcher::new());

    orchestrator.step(&mut store, &SelectFilter::default()).await.unwrap();

    assert_eq!(store.state().tasks[&TaskId::new("t1")].status, TaskStatus::Completed);
    assert_eq!(git.pushes().len(), 1);
    assert_eq!(store.state().activity_log.len(), 1);
}

#[tokio::test]
async fn reviewer_fallback_reject_increments_rejection_count() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    store.create_task(sample_task("t1", TaskStatus::Pending)).unwrap();
    let mut under_review = store.state().tasks[&TaskId::new("t1")].clone();
    under_review.status = TaskStatus::InProgress;
    store
        .transition_task(under_review.clone(), Actor::Orchestrator, None, None, 1_000)
        .unwrap();
    under_review.status = TaskStatus::Review;
    store
        .transition_task(under_review, Actor::Coder, None, None, 1_100)
        .unwrap();

    let agent = FakeAgentInvoker::new();
    agent.push_reviewer_result(ReviewerResult {
        store_mutated: false,
        decision: Some(steroids_core::ports::agent_invoker::ReviewerDecision::Reject),
        ..Default::default()
    });
    let orchestrator = make_orchestrator(agent, FakeGitPort::new(), FakeHookDispatcher::new());

    orchestrator.step(&mut store, &SelectFilter::default()).await.unwrap();

    let task = &store.state().tasks[&TaskId::new("t1")];
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.rejection_count, 1);
}

#[tokio::test]
async fn coder_credit_exhaustion_pauses_without_recording_invocation() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    store.create_task(sample_task("t1", TaskStatus::Pending)).unwrap();

    let agent = FakeAgentInvoker::new();
    agent.push_coder_result(CoderResult::default());
    agent.set_coder_exhaustion(CreditExhaustion {
        provider: "anthropic".to_string(),
        model: "default".to_string(),
        role: steroids_core::Role::Coder,
        message: "usage limit reached".to_string(),
    });
    let hooks = FakeHookDispatcher::new();
    let orchestrator = make_orchestrator(agent, FakeGitPort::new(), hooks.clone());

    let step = orchestrator.step(&mut store, &SelectFilter::default()).await.unwrap();

    assert_eq!(step, LoopStep::CreditPaused);
    assert_eq!(store.state().credit_incidents.len(), 1);
    assert!(store.state().invocations.is_empty());
    assert!(hooks.calls().iter().any(|c| c.event == "credit.exhausted"));
}

#[tokio::test]
async fn batch_mode_invokes_coder_for_every_pending_task_in_the_section() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    let section = steroids_core::Section {
        id: steroids_core::SectionId::new("s1"),
        name: "setup".to_string(),
        position: 0,
        priority: 0,
        skipped: false,
        depends_on: vec![],
    };
    store.create_section(section).unwrap();
    let mut t1 = sample_task("t1", TaskStatus::Pending);
    t1.section_id = Some(steroids_core::SectionId::new("s1"));
    let mut t2 = sample_task("t2", TaskStatus::Pending);
    t2.section_id = Some(steroids_core::SectionId::new("s1"));
    store.create_task(t1).unwrap();
    store.create_task(t2).unwrap();

    let agent = FakeAgentInvoker::new();
    agent.push_coder_result(CoderResult::default());
    agent.push_coder_result(CoderResult::default());
    let mut orchestrator = make_orchestrator(agent.clone(), FakeGitPort::new(), FakeHookDispatcher::new());
    orchestrator.batch_mode = true;
    orchestrator.max_batch_size = 10;

    let step = orchestrator.step(&mut store, &SelectFilter::default()).await.unwrap();

    assert!(matches!(step, LoopStep::Advanced { .. }));
    assert_eq!(store.state().tasks[&TaskId::new("t1")].status, TaskStatus::InProgress);
    assert_eq!(store.state().tasks[&TaskId::new("t2")].status, TaskStatus::InProgress);
    assert_eq!(store.state().invocations.len(), 2);
}

#[tokio::test]
async fn reviewer_fallback_reject_at_rejection_ceiling_records_failed_activity_and_hook() {
    let dir = TempDir::new().unwrap();
    let mut store = ProjectStore::open(dir.path()).unwrap();
    let mut task = sample_task("t1", TaskStatus::Pending);
    task.rejection_count = steroids_core::MAX_REJECTIONS - 1;
    store.create_task(task).unwrap();
    let mut under_review = store.state().tasks[&TaskId::new("t1")].clone();
    under_review.status = TaskStatus::InProgress;
    store
        .transition_task(under_review.clone(), Actor::Orchestrator, None, None, 1_000)
        .unwrap();
    under_review.status = TaskStatus::Review;
    store
        .transition_task(under_review, Actor::Coder, None, None, 1_100)
        .unwrap();

    let agent = FakeAgentInvoker::new();
    agent.push_reviewer_result(ReviewerResult {
        store_mutated: false,
        decision: Some(steroids_core::ports::agent_invoker::ReviewerDecision::Reject),
        ..Default::default()
    });
    let hooks = FakeHookDispatcher::new();
    let orchestrator = make_orchestrator(agent, FakeGitPort::new(), hooks.clone());

    orchestrator.step(&mut store, &SelectFilter::default()).await.unwrap();

    let task = &store.state().tasks[&TaskId::new("t1")];
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(store.state().activity_log.len(), 1);
    assert_eq!(store.state().activity_log[0].kind, ActivityKind::Failed);
    assert!(hooks.calls().iter().any(|c| c.event == "task.failed"));
}
