// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::event::DlqStatus;
use cronplus_core::FakeClock;
use tempfile::tempdir;

fn open(dir: &Path) -> StateStore<FakeClock> {
    StateStore::open(dir, FakeClock::new()).unwrap()
}

#[test]
fn fresh_store_has_not_processed_anything() {
    let dir = tempdir().unwrap();
    let store = open(dir.path());
    assert!(!store.has_processed(&TaskId::new("t1"), Path::new("/in/a.pdf")));
}

#[test]
fn record_then_has_processed_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = open(dir.path());
    let task = TaskId::new("t1");
    let path = Path::new("/in/a.pdf");

    store.record_processed(&task, path, None, "digest".into());
    assert!(store.has_processed(&task, path));

    // Replaying the same fact twice must not change anything observable.
    store.record_processed(&task, path, None, "digest".into());
    assert!(store.has_processed(&task, path));
}

#[test]
fn ledger_survives_reopen() {
    let dir = tempdir().unwrap();
    let task = TaskId::new("t1");
    let path = Path::new("/in/a.pdf");
    {
        let store = open(dir.path());
        store.record_processed(&task, path, None, "digest".into());
    }
    let store = open(dir.path());
    assert!(store.has_processed(&task, path));
}

#[test]
fn checkpoint_then_reopen_replays_from_snapshot() {
    let dir = tempdir().unwrap();
    let task = TaskId::new("t1");
    {
        let store = open(dir.path());
        store.record_processed(&task, Path::new("/in/a.pdf"), None, "d1".into());
        store.checkpoint().unwrap();
        store.record_processed(&task, Path::new("/in/b.pdf"), None, "d2".into());
    }
    let store = open(dir.path());
    assert!(store.has_processed(&task, Path::new("/in/a.pdf")));
    assert!(store.has_processed(&task, Path::new("/in/b.pdf")));
}

#[test]
fn enqueue_list_get_update_delete_dlq() {
    let dir = tempdir().unwrap();
    let store = open(dir.path());
    let id = store.enqueue_dlq(
        TaskId::new("t1"),
        PathBuf::from("/in/a.pdf"),
        Some("http".into()),
        "503".into(),
        3,
        Some(500),
        serde_json::json!({"ok": false}),
    );

    let record = store.get_dlq(id).unwrap();
    assert_eq!(record.attempts, 0);
    assert_eq!(record.status, DlqStatus::Failed);

    let listed = store.list_dlq(Some(&TaskId::new("t1")), 10);
    assert_eq!(listed.len(), 1);

    store.update_dlq(id, |r| {
        r.attempts += 1;
        r.status = DlqStatus::Resolved;
    }).unwrap();
    assert_eq!(store.get_dlq(id).unwrap().status, DlqStatus::Resolved);

    store.delete_dlq(id);
    assert!(store.get_dlq(id).is_none());
}

#[test]
fn update_dlq_missing_id_errors() {
    let dir = tempdir().unwrap();
    let store = open(dir.path());
    let result = store.update_dlq(cronplus_core::DlqId::new(), |_| {});
    assert!(result.is_err());
}

#[test]
fn due_retries_respects_schedule() {
    let dir = tempdir().unwrap();
    let store = open(dir.path());
    store.enqueue_dlq(TaskId::new("t1"), PathBuf::from("/in/a"), None, "e".into(), 3, Some(1000), serde_json::Value::Null);

    assert!(store.due_retries(500).is_empty());
    assert_eq!(store.due_retries(1000).len(), 1);
}

#[test]
fn purge_dlq_older_than_removes_expired_records() {
    let dir = tempdir().unwrap();
    let clock = FakeClock::new();
    clock.set_epoch_ms(0);
    let store = StateStore::open(dir.path(), clock.clone()).unwrap();
    store.enqueue_dlq(TaskId::new("t1"), PathBuf::from("/in/a"), None, "e".into(), 3, None, serde_json::Value::Null);

    clock.set_epoch_ms(10_000);
    let purged = store.purge_dlq_older_than(5_000);
    assert_eq!(purged, 1);
    assert_eq!(store.list_dlq(None, 10).len(), 0);
}
