// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup/shutdown sequence (spec §6): open the state store, load
//! and apply the initial configuration, bind the control socket, spawn the
//! DLQ retry driver, and run until asked to stop.

use crate::dlq_driver;
use crate::listener::{self, ListenerCtx};
use crate::manager::Manager;
use crate::observability::EventBus;
use cronplus_adapters::{LpPrinterAdapter, ReqwestHttpAdapter};
use cronplus_core::SystemClock;
use cronplus_storage::StateStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Where the daemon reads its configuration from and where it exposes its
/// control socket and durable state.
pub struct Paths {
    pub config_path: PathBuf,
    pub socket_path: PathBuf,
    pub state_dir: PathBuf,
}

/// Runs the daemon to completion: starts every configured task, serves the
/// control socket, and blocks until `shutdown` is cancelled. Returns the
/// error that should determine the process exit code (spec §6), or `Ok`
/// on a clean shutdown.
pub async fn run(paths: Paths, shutdown: CancellationToken) -> Result<(), crate::DaemonError> {
    let config = cronplus_config::load_from_path(&paths.config_path)?;
    info!(path = %paths.config_path.display(), tasks = config.tasks.len(), "configuration loaded");

    let clock = SystemClock;
    let store = Arc::new(StateStore::open(std::path::Path::new(&paths.state_dir), clock.clone())?);
    info!(dir = %paths.state_dir.display(), "state store opened");

    let bus = EventBus::new();
    let manager = Arc::new(Manager::new(
        Arc::clone(&store),
        bus.clone(),
        Arc::new(ReqwestHttpAdapter),
        Arc::new(LpPrinterAdapter),
        clock.clone(),
    ));

    let outcome = manager.apply(&config).await;
    info!(
        added = outcome.added,
        updated = outcome.updated,
        removed = outcome.removed,
        unchanged = outcome.unchanged,
        disabled = outcome.disabled.len(),
        "initial configuration applied"
    );

    let listener = listener::bind(&paths.socket_path)?;
    let ctx = Arc::new(ListenerCtx {
        manager: Arc::clone(&manager),
        config_path: paths.config_path.clone(),
        current_config: parking_lot::RwLock::new(config),
    });

    let listener_cancel = shutdown.clone();
    let listener_task = tokio::spawn(listener::run(listener, ctx, listener_cancel));

    let dlq_cancel = shutdown.clone();
    let dlq_task = tokio::spawn(dlq_driver::run(
        Arc::clone(&store),
        bus.clone(),
        Arc::new(ReqwestHttpAdapter),
        Arc::new(LpPrinterAdapter),
        clock,
        manager.clone() as Arc<dyn dlq_driver::TaskLookup>,
        dlq_cancel,
    ));

    shutdown.cancelled().await;
    info!("shutdown requested, draining tasks");

    manager.shutdown().await;
    let _ = listener_task.await;
    let _ = dlq_task.await;
    let _ = store.checkpoint();
    let _ = std::fs::remove_file(&paths.socket_path);

    info!("clean shutdown complete");
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
