// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence for crash recovery (spec §4.1 "periodic snapshot").
//!
//! Snapshots store the complete materialized state at a point in time,
//! identified by the WAL sequence number it was taken at. Recovery loads the
//! snapshot and replays WAL entries after that sequence, so startup doesn't
//! have to walk the log from the beginning of time. Grounded on the
//! teacher's `oj-daemon::storage::snapshot` (versioned, zstd-compressed,
//! rotating `.bak`/`.bak.N` backups).

use crate::state::MaterializedState;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::SnapshotError;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;
const MAX_BAK_FILES: u32 = 3;
const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub seq: u64,
    pub state: MaterializedState,
    pub created_at_ms: u64,
}

impl Snapshot {
    pub fn new(seq: u64, state: MaterializedState, created_at_ms: u64) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, seq, state, created_at_ms }
    }

    /// Writes the snapshot atomically: compress to a temp file, rotate any
    /// existing snapshot into `.bak`/`.bak.N`, then rename the temp file
    /// into place. A crash mid-write leaves the previous snapshot intact.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("snap.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut encoder = zstd::Encoder::new(BufWriter::new(file), ZSTD_LEVEL)
                .map_err(|e| SnapshotError::Compression(e.to_string()))?;
            serde_json::to_writer(&mut encoder, self)?;
            encoder.finish().map_err(|e| SnapshotError::Compression(e.to_string()))?;
        }
        if path.exists() {
            rotate_bak_path(path);
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Option<Self>, SnapshotError> {
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path)?;
        let decoder =
            zstd::Decoder::new(BufReader::new(file)).map_err(|e| SnapshotError::Compression(e.to_string()))?;
        let snapshot: Snapshot = serde_json::from_reader(decoder)?;
        Ok(Some(snapshot))
    }
}

/// Picks the next `.bak` / `.bak.N` path, rotating older backups out. Keeps
/// up to [`MAX_BAK_FILES`] backups.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    let dest = bak(1);
    let _ = fs::rename(path, &dest);
    dest
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
