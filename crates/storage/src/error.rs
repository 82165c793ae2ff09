// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("failed to open WAL at {path:?}: {source}")]
    Open { path: std::path::PathBuf, #[source] source: std::io::Error },
    #[error("failed to append to WAL: {0}")]
    Append(#[source] std::io::Error),
    #[error("failed to flush WAL: {0}")]
    Flush(#[source] std::io::Error),
    #[error("failed to read WAL entry: {0}")]
    Read(#[source] std::io::Error),
    #[error("corrupt WAL entry at line {line}: {source}")]
    Corrupt { line: u64, #[source] source: serde_json::Error },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("compression error: {0}")]
    Compression(String),
}

/// Errors the [`crate::store::StateStore`] surfaces. Per spec §4.1, most of
/// these are non-fatal at the call site: `hasProcessed` degrades to "not
/// processed" and `recordProcessed`/DLQ write failures log a warning and
/// buffer rather than failing the execution. Only [`StoreError::Open`] is
/// treated as fatal, at daemon startup (spec §6 exit code 2).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open state store: {0}")]
    Open(#[from] WalError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("dlq record {0} not found")]
    DlqNotFound(String),
}
