// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cronplus_core::TaskId;
use tempfile::tempdir;

fn zip_step(destination: String) -> ArchiveStep {
    ArchiveStep {
        destination,
        format: ArchiveFormat::Zip,
        compression_level: 6,
        conflict_strategy: ConflictStrategy::Rename,
        delete_original: false,
        append_to_existing: false,
        max_archive_bytes: None,
        verify_archive: false,
    }
}

async fn ctx_for(path: PathBuf) -> ExecutionContext {
    ExecutionContext::new(TaskId::new("t1"), path, &[], 0).unwrap()
}

#[tokio::test]
async fn zip_archive_contains_the_source_file() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("report.txt");
    std::fs::write(&source, b"contents").unwrap();
    let destination = dir.path().join("out.zip");
    let step = zip_step(destination.display().to_string());
    let ctx = ctx_for(source.clone()).await;
    let cancel = CancellationToken::new();

    let outcome = execute(&step, &ctx, &cancel).await;

    assert!(outcome.ok, "{}", outcome.message);
    assert!(destination.exists());
    let file = std::fs::File::open(&destination).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), 1);
}

#[tokio::test]
async fn verify_archive_confirms_readability() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("report.txt");
    std::fs::write(&source, b"contents").unwrap();
    let destination = dir.path().join("out.zip");
    let mut step = zip_step(destination.display().to_string());
    step.verify_archive = true;
    let ctx = ctx_for(source.clone()).await;
    let cancel = CancellationToken::new();

    let outcome = execute(&step, &ctx, &cancel).await;

    assert!(outcome.ok, "{}", outcome.message);
}

#[tokio::test]
async fn delete_original_removes_source_after_archiving() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("report.txt");
    std::fs::write(&source, b"contents").unwrap();
    let destination = dir.path().join("out.zip");
    let mut step = zip_step(destination.display().to_string());
    step.delete_original = true;
    let ctx = ctx_for(source.clone()).await;
    let cancel = CancellationToken::new();

    let outcome = execute(&step, &ctx, &cancel).await;

    assert!(outcome.ok, "{}", outcome.message);
    assert!(!source.exists());
}

#[tokio::test]
async fn skip_conflict_strategy_leaves_existing_archive_untouched() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("report.txt");
    std::fs::write(&source, b"contents").unwrap();
    let destination = dir.path().join("out.zip");
    std::fs::write(&destination, b"not a real zip").unwrap();
    let mut step = zip_step(destination.display().to_string());
    step.conflict_strategy = ConflictStrategy::Skip;
    let ctx = ctx_for(source.clone()).await;
    let cancel = CancellationToken::new();

    let outcome = execute(&step, &ctx, &cancel).await;

    assert!(outcome.ok, "{}", outcome.message);
    assert_eq!(std::fs::read(&destination).unwrap(), b"not a real zip");
}

#[tokio::test]
async fn gzip_archive_round_trips_the_source_bytes() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("report.txt");
    std::fs::write(&source, b"gzip me").unwrap();
    let destination = dir.path().join("out.gz");
    let mut step = zip_step(destination.display().to_string());
    step.format = ArchiveFormat::Gzip;
    let ctx = ctx_for(source.clone()).await;
    let cancel = CancellationToken::new();

    let outcome = execute(&step, &ctx, &cancel).await;

    assert!(outcome.ok, "{}", outcome.message);
    let file = std::fs::File::open(&destination).unwrap();
    let mut decoder = flate2::read::GzDecoder::new(file);
    let mut content = Vec::new();
    std::io::Read::read_to_end(&mut decoder, &mut content).unwrap();
    assert_eq!(content, b"gzip me");
}
