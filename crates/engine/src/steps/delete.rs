// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `delete` step (spec §4.3): "Respect `minAgeMinutes` (time since mtime);
//! honor `pattern`."

use crate::context::ExecutionContext;
use crate::step_result::StepOutcome;
use cronplus_config::DeleteStep;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use std::time::{Instant, SystemTime};

const SECURE_OVERWRITE_CHUNK: usize = 64 * 1024;

pub async fn execute(step: &DeleteStep, ctx: &ExecutionContext) -> StepOutcome {
    let started = Instant::now();
    let path = &ctx.file_path;

    if let Some(pattern) = &step.pattern {
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| glob::Pattern::new(pattern).ok().map(|p| p.matches(name)))
            .unwrap_or(false);
        if !matches {
            return StepOutcome::success(format!("skipped: {path:?} does not match pattern {pattern:?}"), started.elapsed());
        }
    }

    if let Some(min_age) = step.min_age_minutes {
        match age_minutes(path) {
            Ok(age) if age < min_age => {
                return StepOutcome::failure(
                    format!("file is only {age} minutes old, needs {min_age}"),
                    started.elapsed(),
                    true,
                );
            }
            Ok(_) => {}
            Err(error) => return StepOutcome::failure(format!("failed to stat {path:?}: {error}"), started.elapsed(), true),
        }
    }

    if step.secure {
        if let Err(error) = secure_overwrite(path) {
            return StepOutcome::failure(format!("secure overwrite failed: {error}"), started.elapsed(), true);
        }
    }

    match tokio::fs::remove_file(path).await {
        Ok(()) => StepOutcome::success(format!("deleted {path:?}"), started.elapsed()),
        Err(error) => StepOutcome::failure(format!("delete failed: {error}"), started.elapsed(), true),
    }
}

fn age_minutes(path: &Path) -> std::io::Result<u64> {
    let metadata = std::fs::metadata(path)?;
    let modified = metadata.modified()?;
    let elapsed = SystemTime::now().duration_since(modified).unwrap_or_default();
    Ok(elapsed.as_secs() / 60)
}

fn secure_overwrite(path: &Path) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new().write(true).open(path)?;
    let len = file.metadata()?.len();
    let zeros = [0u8; SECURE_OVERWRITE_CHUNK];
    let mut remaining = len;
    file.seek(SeekFrom::Start(0))?;
    while remaining > 0 {
        let chunk = remaining.min(SECURE_OVERWRITE_CHUNK as u64) as usize;
        file.write_all(&zeros[..chunk])?;
        remaining -= chunk as u64;
    }
    file.flush()
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
