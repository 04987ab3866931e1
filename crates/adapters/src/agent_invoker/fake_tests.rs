// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;
use steroids_core::task::{TaskId, TaskStatus};

fn sample_task() -> Task {
    Task {
        id: TaskId::new("task"),
        title: "do the thing".to_string(),
        section_id: None,
        status: TaskStatus::Pending,
        rejection_count: 0,
        source_file: None,
        file_path: None,
        file_line: None,
        file_commit_sha: None,
        file_content_hash: None,
        created_at_ms: 0,
        updated_at_ms: 0,
    }
}

#[tokio::test]
async fn records_calls_and_returns_queued_results() {
    let fake = FakeAgentInvoker::new();
    fake.push_coder_result(CoderResult {
        submitted_for_review: true,
        ..Default::default()
    });
    let task = sample_task();
    let result = fake
        .invoke_coder(&task, Path::new("/proj"), TaskAction::Start)
        .await
        .unwrap();
    assert!(result.submitted_for_review);
    assert_eq!(fake.calls().len(), 1);
}

#[tokio::test]
async fn drained_queue_falls_back_to_default() {
    let fake = FakeAgentInvoker::new();
    let task = sample_task();
    let result = fake.invoke_reviewer(&task, Path::new("/proj")).await.unwrap();
    assert_eq!(result.decision, None);
}
