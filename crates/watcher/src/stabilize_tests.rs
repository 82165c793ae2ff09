// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write as _;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn missing_file_reports_disappeared() {
    let cancel = CancellationToken::new();
    let outcome = wait_for_stable(
        Path::new("/nonexistent/does/not/exist"),
        100,
        10,
        Duration::from_secs(60),
        &cancel,
    )
    .await;
    assert!(matches!(outcome, StabilizeOutcome::Disappeared));
}

#[tokio::test]
async fn zero_stabilization_window_returns_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt");
    std::fs::write(&path, b"hi").unwrap();
    let cancel = CancellationToken::new();
    let outcome = wait_for_stable(&path, 0, 10, Duration::from_secs(60), &cancel).await;
    assert!(matches!(outcome, StabilizeOutcome::Ready { skipped_deadline: false }));
}

#[tokio::test]
async fn unchanging_file_becomes_ready_after_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt");
    std::fs::write(&path, b"hi").unwrap();
    let cancel = CancellationToken::new();
    let outcome = wait_for_stable(&path, 30, 10, Duration::from_secs(60), &cancel).await;
    assert!(matches!(outcome, StabilizeOutcome::Ready { skipped_deadline: false }));
}

#[tokio::test]
async fn growing_file_resets_the_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt");
    std::fs::write(&path, b"hi").unwrap();
    let path_clone = path.clone();
    let writer = tokio::spawn(async move {
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(15)).await;
            let mut f = std::fs::OpenOptions::new().append(true).open(&path_clone).unwrap();
            f.write_all(b"more").unwrap();
        }
    });
    let cancel = CancellationToken::new();
    let outcome = wait_for_stable(&path, 30, 10, Duration::from_secs(60), &cancel).await;
    writer.await.unwrap();
    assert!(matches!(outcome, StabilizeOutcome::Ready { skipped_deadline: false }));
}

#[tokio::test]
async fn disappearing_mid_wait_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt");
    std::fs::write(&path, b"hi").unwrap();
    let path_clone = path.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(15)).await;
        std::fs::remove_file(&path_clone).unwrap();
    });
    let cancel = CancellationToken::new();
    let outcome = wait_for_stable(&path, 200, 10, Duration::from_secs(60), &cancel).await;
    assert!(matches!(outcome, StabilizeOutcome::Disappeared));
}

#[tokio::test]
async fn cancellation_is_observed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt");
    std::fs::write(&path, b"hi").unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = wait_for_stable(&path, 10_000, 10, Duration::from_secs(60), &cancel).await;
    assert!(matches!(outcome, StabilizeOutcome::Cancelled));
}

#[tokio::test]
async fn exceeding_safety_deadline_emits_with_skip_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.txt");
    std::fs::write(&path, b"hi").unwrap();
    let path_clone = path.clone();
    let writer = tokio::spawn(async move {
        for _ in 0..6 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let mut f = std::fs::OpenOptions::new().append(true).open(&path_clone).unwrap();
            f.write_all(b"x").unwrap();
        }
    });
    let cancel = CancellationToken::new();
    let outcome = wait_for_stable(&path, 1_000, 10, Duration::from_millis(40), &cancel).await;
    writer.await.unwrap();
    assert!(matches!(outcome, StabilizeOutcome::Ready { skipped_deadline: true }));
}
