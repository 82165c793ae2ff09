// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `copy`/`move` steps (spec §4.3). `move` is `copy` with source deletion
//! after a verified write; both share this executor (config §3: "`move`:
//! `copy` with source deletion after verified write").

use crate::context::ExecutionContext;
use crate::step_result::StepOutcome;
use cronplus_config::CopyStep;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

const COPY_BUFFER_BYTES: usize = 1024 * 1024;

pub async fn execute(step: &CopyStep, is_move: bool, ctx: &ExecutionContext, cancel: &CancellationToken) -> StepOutcome {
    let started = Instant::now();
    let source = &ctx.file_path;
    let destination = resolve_destination(&step.destination, source, step.rename_pattern.as_deref());

    if !step.overwrite && destination.exists() {
        return StepOutcome::failure(format!("destination {destination:?} already exists"), started.elapsed(), false);
    }

    if step.create_directories {
        if let Some(parent) = destination.parent() {
            if let Err(error) = tokio::fs::create_dir_all(parent).await {
                return StepOutcome::failure(format!("failed to create directories: {error}"), started.elapsed(), true);
            }
        }
    }

    if step.atomic_move && is_move && same_volume(source, &destination) {
        if let Err(error) = tokio::fs::rename(source, &destination).await {
            return StepOutcome::failure(format!("atomic rename failed: {error}"), started.elapsed(), true);
        }
        return success_outcome(&destination, started);
    }

    let copy_result = tokio::select! {
        _ = cancel.cancelled() => return StepOutcome::cancelled(started.elapsed()),
        result = stream_copy(source, &destination) => result,
    };
    if let Err(error) = copy_result {
        return StepOutcome::failure(format!("copy failed: {error}"), started.elapsed(), true);
    }

    if step.verify_checksum {
        match checksums_match(source, &destination).await {
            Ok(true) => {}
            Ok(false) => {
                let _ = tokio::fs::remove_file(&destination).await;
                return StepOutcome::failure("checksum mismatch after copy".to_string(), started.elapsed(), true);
            }
            Err(error) => {
                return StepOutcome::failure(format!("checksum verification failed: {error}"), started.elapsed(), true)
            }
        }
    }

    if step.preserve_timestamps {
        if let Err(error) = preserve_timestamps(source, &destination) {
            tracing::warn!(%error, "failed to preserve timestamps");
        }
    }

    if is_move {
        if let Err(error) = tokio::fs::remove_file(source).await {
            return StepOutcome::failure(format!("source delete after move failed: {error}"), started.elapsed(), true);
        }
    }

    success_outcome(&destination, started)
}

fn success_outcome(destination: &Path, started: Instant) -> StepOutcome {
    let mut outputs = std::collections::HashMap::new();
    outputs.insert("destinationPath".to_string(), Value::String(destination.display().to_string()));
    StepOutcome::success_with_outputs(format!("wrote {}", destination.display()), started.elapsed(), outputs)
}

fn resolve_destination(destination: &str, source: &Path, rename_pattern: Option<&str>) -> PathBuf {
    let destination = PathBuf::from(destination);
    let is_directory_target = destination.to_string_lossy().ends_with('/') || (destination.exists() && destination.is_dir());
    if let Some(pattern) = rename_pattern {
        let dir = if is_directory_target { destination } else { destination.parent().map(Path::to_path_buf).unwrap_or_default() };
        return dir.join(pattern);
    }
    if is_directory_target {
        let file_name = source.file_name().unwrap_or_default();
        destination.join(file_name)
    } else {
        destination
    }
}

async fn stream_copy(source: &Path, destination: &Path) -> std::io::Result<()> {
    let mut reader = tokio::io::BufReader::with_capacity(COPY_BUFFER_BYTES, tokio::fs::File::open(source).await?);
    let mut writer = tokio::io::BufWriter::with_capacity(COPY_BUFFER_BYTES, tokio::fs::File::create(destination).await?);
    tokio::io::copy(&mut reader, &mut writer).await?;
    tokio::io::AsyncWriteExt::flush(&mut writer).await?;
    Ok(())
}

async fn checksums_match(a: &Path, b: &Path) -> std::io::Result<bool> {
    Ok(sha256_of(a).await? == sha256_of(b).await?)
}

async fn sha256_of(path: &Path) -> std::io::Result<[u8; 32]> {
    let bytes = tokio::fs::read(path).await?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.into())
}

fn preserve_timestamps(source: &Path, destination: &Path) -> std::io::Result<()> {
    let metadata = std::fs::metadata(source)?;
    let mtime = filetime::FileTime::from_last_modification_time(&metadata);
    let atime = filetime::FileTime::from_last_access_time(&metadata);
    filetime::set_file_times(destination, atime, mtime)
}

#[cfg(unix)]
fn same_volume(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    let a_dev = std::fs::metadata(a).map(|m| m.dev());
    let b_parent = b.parent().unwrap_or(b);
    let b_dev = std::fs::metadata(b_parent).map(|m| m.dev());
    matches!((a_dev, b_dev), (Ok(x), Ok(y)) if x == y)
}

#[cfg(not(unix))]
fn same_volume(_a: &Path, _b: &Path) -> bool {
    false
}

#[cfg(test)]
#[path = "copy_move_tests.rs"]
mod tests;
