// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cronplus_adapters::{FakeHttpAdapter, FakePrinterAdapter};
use cronplus_config::{DeleteStep, Step, StepKind};
use cronplus_core::{FakeClock, TaskId};
use cronplus_storage::StateStore;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::tempdir;

struct StaticLookup(HashMap<String, (Vec<Step>, Vec<Variable>)>);

impl TaskLookup for StaticLookup {
    fn pipeline_for(&self, task_id: &TaskId) -> Option<(Vec<Step>, Vec<Variable>)> {
        self.0.get(task_id.as_str()).cloned()
    }
}

fn delete_pipeline() -> Vec<Step> {
    vec![Step {
        name: Some("delete".to_string()),
        enabled: true,
        timeout_seconds: None,
        retry: None,
        condition: None,
        kind: StepKind::Delete(DeleteStep { secure: false, min_age_minutes: None, pattern: None }),
    }]
}

#[tokio::test]
async fn retry_succeeds_and_resolves_the_record() {
    let dir = tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let store = Arc::new(StateStore::open(dir.path(), clock.clone()).expect("open store"));

    let file = dir.path().join("in.txt");
    std::fs::write(&file, b"payload").expect("write file");

    let task_id = TaskId::new("printer-task");
    let dlq_id = store.enqueue_dlq(
        task_id.clone(),
        file.clone(),
        Some("delete".to_string()),
        "simulated failure".to_string(),
        3,
        Some(clock.epoch_ms()),
        serde_json::json!({}),
    );

    let mut lookup = HashMap::new();
    lookup.insert(task_id.as_str().to_string(), (delete_pipeline(), Vec::new()));
    let tasks: Arc<dyn TaskLookup> = Arc::new(StaticLookup(lookup));

    let bus = EventBus::new();
    let path_locks = Arc::new(Mutex::new(HashMap::new()));
    let cancel = CancellationToken::new();
    let record = store.get_dlq(dlq_id).expect("record exists");

    retry_one(
        record,
        &store,
        &bus,
        &FakePrinterAdapter::new(),
        &FakeHttpAdapter::new(),
        &clock,
        tasks.as_ref(),
        &path_locks,
        &cancel,
    )
    .await;

    let updated = store.get_dlq(dlq_id).expect("record still exists");
    assert_eq!(updated.status, cronplus_storage::DlqStatus::Resolved);
    assert!(!file.exists(), "delete step should have removed the file");
}

#[tokio::test]
async fn retry_failure_reschedules_until_attempts_are_exhausted() {
    let dir = tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let store = Arc::new(StateStore::open(dir.path(), clock.clone()).expect("open store"));

    // File does not exist on disk, so the delete step always fails.
    let file = dir.path().join("missing.txt");
    let task_id = TaskId::new("printer-task");
    let dlq_id = store.enqueue_dlq(
        task_id.clone(),
        file,
        Some("delete".to_string()),
        "simulated failure".to_string(),
        2,
        Some(clock.epoch_ms()),
        serde_json::json!({}),
    );

    let mut lookup = HashMap::new();
    lookup.insert(task_id.as_str().to_string(), (delete_pipeline(), Vec::new()));
    let tasks: Arc<dyn TaskLookup> = Arc::new(StaticLookup(lookup));

    let bus = EventBus::new();
    let path_locks = Arc::new(Mutex::new(HashMap::new()));
    let cancel = CancellationToken::new();

    let record = store.get_dlq(dlq_id).expect("record exists");
    retry_one(record, &store, &bus, &FakePrinterAdapter::new(), &FakeHttpAdapter::new(), &clock, tasks.as_ref(), &path_locks, &cancel).await;
    let after_first = store.get_dlq(dlq_id).expect("record exists");
    assert_eq!(after_first.status, cronplus_storage::DlqStatus::Failed);
    assert_eq!(after_first.attempts, 1);

    retry_one(after_first, &store, &bus, &FakePrinterAdapter::new(), &FakeHttpAdapter::new(), &clock, tasks.as_ref(), &path_locks, &cancel).await;
    let after_second = store.get_dlq(dlq_id).expect("record exists");
    assert_eq!(after_second.status, cronplus_storage::DlqStatus::Exhausted);
    assert_eq!(after_second.attempts, 2);
}

#[tokio::test]
async fn retry_skips_records_whose_task_no_longer_exists() {
    let dir = tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let store = Arc::new(StateStore::open(dir.path(), clock.clone()).expect("open store"));
    let task_id = TaskId::new("gone");
    let dlq_id = store.enqueue_dlq(
        task_id,
        dir.path().join("x.txt"),
        None,
        "boom".to_string(),
        3,
        Some(clock.epoch_ms()),
        serde_json::json!({}),
    );

    let tasks: Arc<dyn TaskLookup> = Arc::new(StaticLookup(HashMap::new()));
    let bus = EventBus::new();
    let path_locks = Arc::new(Mutex::new(HashMap::new()));
    let cancel = CancellationToken::new();

    let record = store.get_dlq(dlq_id).expect("record exists");
    retry_one(record, &store, &bus, &FakePrinterAdapter::new(), &FakeHttpAdapter::new(), &clock, tasks.as_ref(), &path_locks, &cancel).await;

    let unchanged = store.get_dlq(dlq_id).expect("record exists");
    assert_eq!(unchanged.status, cronplus_storage::DlqStatus::Failed);
    assert_eq!(unchanged.attempts, 0);
}

#[test]
fn dlq_backoff_matches_pow_2_times_10s() {
    assert_eq!(dlq_backoff(1), Duration::from_secs(20));
    assert_eq!(dlq_backoff(2), Duration::from_secs(40));
    assert_eq!(dlq_backoff(3), Duration::from_secs(80));
}
