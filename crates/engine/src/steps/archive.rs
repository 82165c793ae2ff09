// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `archive` step (spec §4.3): zip in update mode with rollover, or a single
//! gzip stream. Both formats touch the filesystem synchronously, so the
//! whole step body runs inside `spawn_blocking`.

use crate::context::ExecutionContext;
use crate::step_result::StepOutcome;
use cronplus_config::{ArchiveFormat, ArchiveStep, ConflictStrategy};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

pub async fn execute(step: &ArchiveStep, ctx: &ExecutionContext, cancel: &CancellationToken) -> StepOutcome {
    let started = Instant::now();
    if cancel.is_cancelled() {
        return StepOutcome::cancelled(started.elapsed());
    }
    let step = step.clone();
    let source = ctx.file_path.clone();
    let result = tokio::task::spawn_blocking(move || run_archive(&step, &source)).await;
    match result {
        Ok(Ok(outcome)) => outcome_with_timing(outcome, started),
        Ok(Err(error)) => StepOutcome::failure(error, started.elapsed(), true),
        Err(join_error) => StepOutcome::failure(format!("archive task panicked: {join_error}"), started.elapsed(), true),
    }
}

fn outcome_with_timing(mut outcome: StepOutcome, started: Instant) -> StepOutcome {
    outcome.elapsed = started.elapsed();
    outcome
}

enum ArchiveOutput {
    Skipped,
    Written(PathBuf),
}

fn run_archive(step: &ArchiveStep, source: &Path) -> Result<StepOutcome, String> {
    let output = match step.format {
        ArchiveFormat::Zip => archive_zip(step, source)?,
        ArchiveFormat::Gzip => archive_gzip(step, source)?,
    };
    let destination = match output {
        ArchiveOutput::Skipped => return Ok(StepOutcome::success("skipped: destination exists", std::time::Duration::ZERO)),
        ArchiveOutput::Written(path) => path,
    };
    if step.delete_original {
        std::fs::remove_file(source).map_err(|e| format!("failed to delete original after archiving: {e}"))?;
    }
    let mut outputs = std::collections::HashMap::new();
    outputs.insert("archivePath".to_string(), Value::String(destination.display().to_string()));
    Ok(StepOutcome::success_with_outputs(
        format!("archived into {}", destination.display()),
        std::time::Duration::ZERO,
        outputs,
    ))
}

fn archive_zip(step: &ArchiveStep, source: &Path) -> Result<ArchiveOutput, String> {
    let entry_name = source.file_name().and_then(|n| n.to_str()).unwrap_or("entry").to_string();
    let base = PathBuf::from(&step.destination);
    let target = if step.append_to_existing && base.exists() {
        rollover_if_needed(&base, step.max_archive_bytes)
    } else {
        match resolve_conflict(&base, step.conflict_strategy) {
            Some(path) => path,
            None => return Ok(ArchiveOutput::Skipped),
        }
    };

    let append = step.append_to_existing && target.exists();
    let file = if append {
        std::fs::OpenOptions::new().read(true).write(true).open(&target)
    } else {
        std::fs::File::create(&target)
    }
    .map_err(|e| format!("failed to open archive {target:?}: {e}"))?;

    let mut writer = if append {
        zip::ZipWriter::new_append(file).map_err(|e| format!("failed to open existing archive for append: {e}"))?
    } else {
        zip::ZipWriter::new(file)
    };

    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .compression_level(Some(step.compression_level as i64));
    writer
        .start_file(&entry_name, options)
        .map_err(|e| format!("failed to start zip entry {entry_name:?}: {e}"))?;
    let mut content = std::fs::File::open(source).map_err(|e| format!("failed to open source {source:?}: {e}"))?;
    std::io::copy(&mut content, &mut writer).map_err(|e| format!("failed to write zip entry: {e}"))?;
    writer.finish().map_err(|e| format!("failed to finalize archive: {e}"))?;

    if step.verify_archive {
        verify_zip_readable(&target, &entry_name)?;
    }
    Ok(ArchiveOutput::Written(target))
}

fn verify_zip_readable(archive_path: &Path, expected_entry: &str) -> Result<(), String> {
    let file = std::fs::File::open(archive_path).map_err(|e| format!("failed to reopen archive for verification: {e}"))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| format!("archive is not readable after write: {e}"))?;
    let mut found = false;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| format!("corrupt archive entry: {e}"))?;
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).map_err(|e| format!("failed to read back archive entry: {e}"))?;
        if entry.name() == expected_entry {
            found = true;
        }
    }
    if found {
        Ok(())
    } else {
        Err(format!("verifyArchive: entry {expected_entry:?} missing after write"))
    }
}

fn archive_gzip(step: &ArchiveStep, source: &Path) -> Result<ArchiveOutput, String> {
    let base = PathBuf::from(&step.destination);
    let target = match resolve_conflict(&base, step.conflict_strategy) {
        Some(path) => path,
        None => return Ok(ArchiveOutput::Skipped),
    };
    let mut input = std::fs::File::open(source).map_err(|e| format!("failed to open source {source:?}: {e}"))?;
    let output = std::fs::File::create(&target).map_err(|e| format!("failed to create {target:?}: {e}"))?;
    let mut encoder = GzEncoder::new(output, Compression::new(step.compression_level.clamp(0, 9) as u32));
    std::io::copy(&mut input, &mut encoder).map_err(|e| format!("gzip compression failed: {e}"))?;
    encoder.finish().map_err(|e| format!("failed to finalize gzip stream: {e}"))?;
    if step.verify_archive {
        let file = std::fs::File::open(&target).map_err(|e| format!("failed to reopen gzip output: {e}"))?;
        let mut decoder = flate2::read::GzDecoder::new(file);
        let mut sink = Vec::new();
        decoder.read_to_end(&mut sink).map_err(|e| format!("verifyArchive: gzip stream unreadable: {e}"))?;
    }
    Ok(ArchiveOutput::Written(target))
}

/// If `base` would grow past `max_bytes` once another entry is appended,
/// roll to `<stem>-2.<ext>`, `<stem>-3.<ext>`, ... finding the first that
/// either doesn't exist or is itself still under the cap.
fn rollover_if_needed(base: &Path, max_bytes: Option<u64>) -> PathBuf {
    let Some(max_bytes) = max_bytes else { return base.to_path_buf() };
    let current_size = std::fs::metadata(base).map(|m| m.len()).unwrap_or(0);
    if current_size < max_bytes {
        return base.to_path_buf();
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("archive").to_string();
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("zip").to_string();
    let parent = base.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut n = 2u32;
    loop {
        let candidate = parent.join(format!("{stem}-{n}.{ext}"));
        let size = std::fs::metadata(&candidate).map(|m| m.len()).unwrap_or(0);
        if size < max_bytes {
            return candidate;
        }
        n += 1;
    }
}

fn resolve_conflict(path: &Path, strategy: ConflictStrategy) -> Option<PathBuf> {
    if !path.exists() {
        return Some(path.to_path_buf());
    }
    match strategy {
        ConflictStrategy::Overwrite => Some(path.to_path_buf()),
        ConflictStrategy::Skip => None,
        ConflictStrategy::Rename | ConflictStrategy::IncrementNumber => {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("archive").to_string();
            let ext = path.extension().and_then(|s| s.to_str()).map(str::to_string);
            let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let mut n = 1u32;
            loop {
                let candidate = match &ext {
                    Some(ext) => parent.join(format!("{stem}-{n}.{ext}")),
                    None => parent.join(format!("{stem}-{n}")),
                };
                if !candidate.exists() {
                    return Some(candidate);
                }
                n += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
