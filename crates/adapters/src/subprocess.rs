// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timeout-wrapped subprocess execution, shared by every adapter that
//! shells out to a platform tool.

use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("{label} timed out after {timeout_secs}s")]
    TimedOut { label: String, timeout_secs: u64 },
    #[error("{label} failed to spawn: {source}")]
    Spawn { label: String, #[source] source: std::io::Error },
}

/// Runs `cmd` to completion, killing it if it outlives `timeout`.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    label: &str,
) -> Result<std::process::Output, SubprocessError> {
    let child = cmd.kill_on_drop(true).output();
    match tokio::time::timeout(timeout, child).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(SubprocessError::Spawn { label: label.to_string(), source }),
        Err(_) => Err(SubprocessError::TimedOut { label: label.to_string(), timeout_secs: timeout.as_secs() }),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
