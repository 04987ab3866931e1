// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TestEvent {
    Created { id: u32 },
    Renamed { id: u32, name: String },
}

#[test]
fn append_flush_and_read_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wal.jsonl");
    let mut wal: Wal<TestEvent> = Wal::open(&path, 0).unwrap();

    let seq1 = wal.append(&TestEvent::Created { id: 1 }).unwrap();
    let seq2 = wal
        .append(&TestEvent::Renamed {
            id: 1,
            name: "x".to_string(),
        })
        .unwrap();
    assert_eq!(seq1, 1);
    assert_eq!(seq2, 2);
    wal.flush().unwrap();

    let entry = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(entry.seq, 1);
    assert_eq!(entry.event, TestEvent::Created { id: 1 });
    wal.mark_processed(1);

    let entry2 = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(entry2.seq, 2);

    assert!(wal.next_unprocessed().unwrap().is_none());
}

#[test]
fn reopen_resumes_from_processed_seq() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wal.jsonl");
    {
        let mut wal: Wal<TestEvent> = Wal::open(&path, 0).unwrap();
        wal.append(&TestEvent::Created { id: 1 }).unwrap();
        wal.append(&TestEvent::Created { id: 2 }).unwrap();
        wal.flush().unwrap();
    }

    let mut wal: Wal<TestEvent> = Wal::open(&path, 1).unwrap();
    let entry = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(entry.seq, 2);
    assert_eq!(wal.write_seq(), 2);
}

#[test]
fn truncate_before_drops_processed_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wal.jsonl");
    let mut wal: Wal<TestEvent> = Wal::open(&path, 0).unwrap();
    wal.append(&TestEvent::Created { id: 1 }).unwrap();
    wal.append(&TestEvent::Created { id: 2 }).unwrap();
    wal.append(&TestEvent::Created { id: 3 }).unwrap();
    wal.flush().unwrap();
    wal.mark_processed(2);

    wal.truncate_before(3).unwrap();
    let remaining = wal.entries_after(0).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].seq, 3);
}

#[test]
fn entries_after_filters_by_sequence() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wal.jsonl");
    let mut wal: Wal<TestEvent> = Wal::open(&path, 0).unwrap();
    wal.append(&TestEvent::Created { id: 1 }).unwrap();
    wal.append(&TestEvent::Created { id: 2 }).unwrap();
    wal.flush().unwrap();

    let entries = wal.entries_after(1).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].seq, 2);
}

#[test]
fn corrupt_tail_is_rotated_to_bak_on_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wal.jsonl");
    {
        let mut wal: Wal<TestEvent> = Wal::open(&path, 0).unwrap();
        wal.append(&TestEvent::Created { id: 1 }).unwrap();
        wal.flush().unwrap();
    }
    let mut contents = std::fs::read_to_string(&path).unwrap();
    contents.push_str("{not json\n");
    std::fs::write(&path, contents).unwrap();

    let wal: Wal<TestEvent> = Wal::open(&path, 0).unwrap();
    assert_eq!(wal.write_seq(), 1);
    assert!(dir.path().join("wal.bak").exists());
}
