// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only, JSON-lines write-ahead log.
//!
//! One line per entry (`{"seq": N, "event": {...}}`), opened once at
//! startup, appended to for the life of the process, and periodically
//! snapshotted
//! ([`crate::snapshot`]) so replay on the next restart doesn't have to walk
//! unbounded history. A corrupt tail (partial write from a crash mid-append)
//! is rotated to a `.bak` file rather than losing the whole log — the
//! valid prefix is kept and replay proceeds from there.

use crate::error::WalError;
use crate::event::StoreEvent;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WalLine {
    seq: u64,
    event: StoreEvent,
}

/// One entry read back from the log.
#[derive(Debug, Clone)]
pub struct WalEntry {
    pub seq: u64,
    pub event: StoreEvent,
}

/// An append-only log of [`StoreEvent`]s with a sequential replay cursor.
pub struct Wal {
    path: PathBuf,
    writer: BufWriter<File>,
    reader: BufReader<File>,
    write_seq: u64,
    processed_seq: u64,
}

impl Wal {
    /// Opens (creating if absent) the log at `path`. `start_seq` is the
    /// sequence number already accounted for by a prior snapshot (0 if
    /// there is none) — [`Self::next_unprocessed`] will not return entries
    /// at or below it.
    ///
    /// If the tail of an existing file fails to parse (a partial write from
    /// a crash mid-append), the valid prefix is kept, the original file is
    /// copied to `<path>.bak`, and the file on disk is truncated to the
    /// valid prefix so future appends don't interleave with garbage.
    pub fn open(path: &Path, start_seq: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| WalError::Open { path: path.to_path_buf(), source })?;

        let (max_seq, valid_len) = Self::scan(path)?;

        let read_file = File::open(path).map_err(|source| WalError::Open { path: path.to_path_buf(), source })?;
        let metadata_len =
            read_file.metadata().map_err(|source| WalError::Open { path: path.to_path_buf(), source })?.len();
        if valid_len < metadata_len {
            Self::rotate_corrupt_tail(path, valid_len)?;
        }

        let writer_file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|source| WalError::Open { path: path.to_path_buf(), source })?;
        let mut reader_file =
            File::open(path).map_err(|source| WalError::Open { path: path.to_path_buf(), source })?;
        reader_file.seek(SeekFrom::Start(0)).map_err(WalError::Read)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(writer_file),
            reader: BufReader::new(reader_file),
            write_seq: max_seq,
            processed_seq: start_seq,
        })
    }

    /// Reads the file once to find the highest valid `seq` and the byte
    /// length of the valid (parseable) prefix.
    fn scan(path: &Path) -> Result<(u64, u64), WalError> {
        let file = File::open(path).map_err(|source| WalError::Open { path: path.to_path_buf(), source })?;
        let mut reader = BufReader::new(file);
        let mut max_seq = 0u64;
        let mut valid_len = 0u64;
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).map_err(WalError::Read)?;
            if bytes_read == 0 {
                break;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                valid_len += bytes_read as u64;
                continue;
            }
            match serde_json::from_str::<WalLine>(trimmed) {
                Ok(entry) => {
                    max_seq = max_seq.max(entry.seq);
                    valid_len += bytes_read as u64;
                }
                Err(_) => break,
            }
        }
        Ok((max_seq, valid_len))
    }

    fn rotate_corrupt_tail(path: &Path, valid_len: u64) -> Result<(), WalError> {
        let bak_path = path.with_extension("wal.bak");
        std::fs::copy(path, &bak_path).map_err(WalError::Read)?;
        tracing::warn!(
            path = %path.display(),
            backup = %bak_path.display(),
            "WAL tail failed to parse; truncated to last valid entry and kept full copy in backup"
        );
        let file = OpenOptions::new().write(true).open(path).map_err(WalError::Read)?;
        file.set_len(valid_len).map_err(WalError::Read)?;
        Ok(())
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Appends one entry, returning its assigned sequence number. Buffered —
    /// call [`Self::flush`] to guarantee it reaches disk.
    pub fn append(&mut self, event: &StoreEvent) -> Result<u64, WalError> {
        self.write_seq += 1;
        let line = WalLine { seq: self.write_seq, event: event.clone() };
        let json = serde_json::to_string(&line).map_err(|e| WalError::Append(std::io::Error::other(e)))?;
        writeln!(self.writer, "{json}").map_err(WalError::Append)?;
        Ok(self.write_seq)
    }

    pub fn flush(&mut self) -> Result<(), WalError> {
        self.writer.flush().map_err(WalError::Flush)?;
        self.writer.get_ref().sync_data().map_err(WalError::Flush)
    }

    /// Returns the next entry past the replay cursor whose `seq` is greater
    /// than [`Self::processed_seq`], or `None` once the log is exhausted.
    /// Does not advance `processed_seq` itself — call [`Self::mark_processed`].
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = self.reader.read_line(&mut line).map_err(WalError::Read)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                continue;
            }
            let parsed: WalLine = match serde_json::from_str(trimmed) {
                Ok(p) => p,
                Err(_) => return Ok(None), // corrupt tail past what `scan` already truncated
            };
            if parsed.seq <= self.processed_seq {
                continue;
            }
            return Ok(Some(WalEntry { seq: parsed.seq, event: parsed.event }));
        }
    }

    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = self.processed_seq.max(seq);
    }

    /// Replays every unprocessed entry through `apply`, marking each
    /// processed as it's consumed. Used at startup after loading a snapshot.
    pub fn replay(&mut self, mut apply: impl FnMut(&StoreEvent)) -> Result<(), WalError> {
        while let Some(entry) = self.next_unprocessed()? {
            apply(&entry.event);
            self.mark_processed(entry.seq);
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
