// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

#[test]
fn rotate_bak_path_prefers_plain_bak_when_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.bin");
    assert_eq!(rotate_bak_path(&path), path.with_extension("bak"));
}

#[test]
fn rotate_bak_path_shifts_existing_backups() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.bin");
    std::fs::write(path.with_extension("bak"), b"first").unwrap();

    let target = rotate_bak_path(&path);
    assert_eq!(target, path.with_extension("bak"));
    // the pre-existing .bak should have shifted to .bak.2
    assert!(path.with_extension("bak.2").exists());
}

#[test]
fn rotate_bak_path_drops_oldest_at_capacity() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.bin");
    std::fs::write(path.with_extension("bak"), b"1").unwrap();
    std::fs::write(path.with_extension("bak.2"), b"2").unwrap();
    std::fs::write(path.with_extension("bak.3"), b"3").unwrap();

    rotate_bak_path(&path);
    // the oldest (.bak.3) should have been removed before the shift
    assert!(path.with_extension("bak.3").exists());
    assert_eq!(std::fs::read(path.with_extension("bak.3")).unwrap(), b"2");
}

#[test]
fn snapshot_new_stamps_version_seq_and_state() {
    let snap = Snapshot::new(1, 42, "state".to_string());
    assert_eq!(snap.version, 1);
    assert_eq!(snap.seq, 42);
    assert_eq!(snap.state, "state");
}
