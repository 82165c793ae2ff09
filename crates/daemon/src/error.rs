// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level daemon error taxonomy (spec §7, §6 exit codes).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    /// Exit code 1: config failed to parse or validate as a whole document.
    #[error("config load/validation failed: {0}")]
    Config(#[from] cronplus_config::ConfigError),

    /// Exit code 2: the state store could not be opened.
    #[error("state store open failed: {0}")]
    StateStore(#[from] cronplus_storage::StoreError),

    #[error("failed to bind control socket at {path}: {source}")]
    Listen { path: PathBuf, #[source] source: std::io::Error },

    #[error("control protocol error: {0}")]
    Protocol(#[from] cronplus_wire::ProtocolError),
}
