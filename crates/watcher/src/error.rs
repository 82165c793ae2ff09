// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("invalid glob pattern {pattern:?}: {source}")]
    InvalidGlob { pattern: String, #[source] source: glob::PatternError },
    #[error("failed to watch directory {directory:?}: {source}")]
    NotifyInit { directory: std::path::PathBuf, #[source] source: notify::Error },
    #[error("notifier reported an error: {0}")]
    NotifyRuntime(#[from] notify::Error),
}
