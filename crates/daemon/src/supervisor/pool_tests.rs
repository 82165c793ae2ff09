// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;
use std::time::Duration;

fn ready(path: &str) -> ReadyFile {
    ReadyFile { path: PathBuf::from(path), detected_at_ms: 0, stabilization_skipped: false }
}

#[tokio::test]
async fn admits_within_capacity_in_order() {
    let pool = WorkerPool::new(2);
    pool.offer(ready("/in/a"));
    pool.offer(ready("/in/b"));

    let first = pool.next_admitted().await.expect("a");
    let second = pool.next_admitted().await.expect("b");
    assert_eq!(first.path, PathBuf::from("/in/a"));
    assert_eq!(second.path, PathBuf::from("/in/b"));
}

#[tokio::test]
async fn overflow_sheds_the_oldest_entry_and_counts_it() {
    let pool = WorkerPool::new(1); // capacity = 1 * ADMISSION_MULTIPLIER
    for i in 0..(ADMISSION_MULTIPLIER + 2) {
        pool.offer(ready(&format!("/in/{i}")));
    }
    assert_eq!(pool.shed_count(), 2);

    // The two oldest (0 and 1) were dropped; 2 is the oldest survivor.
    let first = pool.next_admitted().await.expect("first surviving entry");
    assert_eq!(first.path, PathBuf::from("/in/2"));
}

#[tokio::test]
async fn closing_the_queue_unblocks_a_pending_pop() {
    let pool = Arc::new(WorkerPool::new(1));
    let waiter = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.next_admitted().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    pool.close();
    let result = waiter.await.expect("join");
    assert!(result.is_none());
}

#[tokio::test]
async fn semaphore_caps_concurrent_slots_at_max_concurrent() {
    let pool = Arc::new(WorkerPool::new(2));
    let _a = pool.acquire_slot().await;
    let _b = pool.acquire_slot().await;

    let pool2 = Arc::clone(&pool);
    let blocked = tokio::spawn(async move {
        tokio::time::timeout(Duration::from_millis(50), pool2.acquire_slot()).await
    });
    let result = blocked.await.expect("join");
    assert!(result.is_err(), "third acquire should not complete while 2 permits are held");
}

#[tokio::test]
async fn same_path_is_serialized_across_two_acquirers() {
    let pool = Arc::new(WorkerPool::new(4));
    let path = PathBuf::from("/in/same.txt");
    let guard = pool.acquire_path(&path).await;

    let pool2 = Arc::clone(&pool);
    let path2 = path.clone();
    let waiter = tokio::spawn(async move {
        tokio::time::timeout(Duration::from_millis(30), pool2.acquire_path(&path2)).await
    });
    let still_blocked = waiter.await.expect("join");
    assert!(still_blocked.is_err());
    drop(guard);
}

#[tokio::test]
async fn distinct_paths_do_not_serialize_against_each_other() {
    let pool = Arc::new(WorkerPool::new(4));
    let _a = pool.acquire_path(Path::new("/in/a")).await;
    let b = tokio::time::timeout(Duration::from_millis(30), pool.acquire_path(Path::new("/in/b"))).await;
    assert!(b.is_ok());
}

#[test]
fn counters_track_success_and_failure() {
    let counters = Counters::default();
    counters.record_success(100);
    assert_eq!(counters.processed(), 1);
    assert_eq!(counters.consecutive_errors(), 0);

    let c1 = counters.record_failure(200);
    let c2 = counters.record_failure(300);
    assert_eq!(c1, 1);
    assert_eq!(c2, 2);
    assert_eq!(counters.errors(), 2);

    counters.record_success(400);
    assert_eq!(counters.consecutive_errors(), 0);
}

#[test]
fn error_rate_is_zero_with_no_attempts() {
    let counters = Counters::default();
    assert_eq!(counters.error_rate(), 0.0);
}
