// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cronplus_adapters::{FakeHttpAdapter, FakePrinterAdapter};
use cronplus_config::{LoggingConfig, MetricsConfig, RuntimeConfig};
use cronplus_core::FakeClock;
use cronplus_storage::StateStore;
use tempfile::tempdir;
use tokio::net::UnixStream;

fn empty_config() -> Config {
    Config { version: 1, logging: LoggingConfig::default(), runtime: RuntimeConfig::default(), metrics: MetricsConfig::default(), tasks: Vec::new() }
}

async fn roundtrip(socket_path: &Path, request: Request) -> Response {
    let mut stream = UnixStream::connect(socket_path).await.expect("connect");
    write_message(&mut stream, &request).await.expect("write request");
    read_message(&mut stream).await.expect("read response")
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let state_dir = tempdir().expect("state dir");
    let socket_dir = tempdir().expect("socket dir");
    let socket_path = socket_dir.path().join("cronplusd.sock");

    let clock = FakeClock::new();
    let store = Arc::new(StateStore::open(state_dir.path(), clock.clone()).expect("open store"));
    let manager = Arc::new(Manager::new(store, crate::observability::EventBus::new(), Arc::new(FakePrinterAdapter::new()), Arc::new(FakeHttpAdapter::new()), clock));
    let ctx = Arc::new(ListenerCtx { manager, config_path: PathBuf::from("unused.json"), current_config: parking_lot::RwLock::new(empty_config()) });

    let listener = bind(&socket_path).expect("bind");
    let cancel = CancellationToken::new();
    let server = tokio::spawn(run(listener, ctx, cancel.clone()));

    let response = roundtrip(&socket_path, Request::Ping).await;
    assert!(matches!(response, Response::Pong));

    cancel.cancel();
    let _ = server.await;
}

#[tokio::test]
async fn get_config_returns_the_currently_applied_config() {
    let state_dir = tempdir().expect("state dir");
    let socket_dir = tempdir().expect("socket dir");
    let socket_path = socket_dir.path().join("cronplusd.sock");

    let clock = FakeClock::new();
    let store = Arc::new(StateStore::open(state_dir.path(), clock.clone()).expect("open store"));
    let manager = Arc::new(Manager::new(store, crate::observability::EventBus::new(), Arc::new(FakePrinterAdapter::new()), Arc::new(FakeHttpAdapter::new()), clock));
    let ctx = Arc::new(ListenerCtx { manager, config_path: PathBuf::from("unused.json"), current_config: parking_lot::RwLock::new(empty_config()) });

    let listener = bind(&socket_path).expect("bind");
    let cancel = CancellationToken::new();
    let server = tokio::spawn(run(listener, ctx, cancel.clone()));

    let response = roundtrip(&socket_path, Request::GetConfig).await;
    match response {
        Response::Config { config } => assert_eq!(config.version, 1),
        other => panic!("unexpected response: {other:?}"),
    }

    cancel.cancel();
    let _ = server.await;
}

#[tokio::test]
async fn tasks_snapshot_reflects_applied_tasks() {
    let state_dir = tempdir().expect("state dir");
    let socket_dir = tempdir().expect("socket dir");
    let socket_path = socket_dir.path().join("cronplusd.sock");

    let clock = FakeClock::new();
    let store = Arc::new(StateStore::open(state_dir.path(), clock.clone()).expect("open store"));
    let manager = Arc::new(Manager::new(store, crate::observability::EventBus::new(), Arc::new(FakePrinterAdapter::new()), Arc::new(FakeHttpAdapter::new()), clock));
    let ctx = Arc::new(ListenerCtx { manager, config_path: PathBuf::from("unused.json"), current_config: parking_lot::RwLock::new(empty_config()) });

    let listener = bind(&socket_path).expect("bind");
    let cancel = CancellationToken::new();
    let server = tokio::spawn(run(listener, ctx, cancel.clone()));

    let response = roundtrip(&socket_path, Request::TasksSnapshot).await;
    match response {
        Response::TasksSnapshot { tasks } => assert!(tasks.is_empty()),
        other => panic!("unexpected response: {other:?}"),
    }

    cancel.cancel();
    let _ = server.await;
}

#[tokio::test]
async fn rebinding_over_a_stale_socket_file_succeeds() {
    let socket_dir = tempdir().expect("socket dir");
    let socket_path = socket_dir.path().join("cronplusd.sock");
    std::fs::write(&socket_path, b"stale").expect("write stale file");

    bind(&socket_path).expect("bind should remove the stale file first");
}
