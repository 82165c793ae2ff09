// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cronplus-storage: the durable state store (spec §4.1) — a write-ahead
//! log of ledger and dead-letter facts, a periodically-snapshotted
//! in-memory materialized view, and the `StateStore` contract every other
//! crate programs against.

pub mod error;
pub mod event;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod wal;

pub use error::{SnapshotError, StoreError, WalError};
pub use event::{DlqRecord, DlqStatus, StoreEvent};
pub use snapshot::Snapshot;
pub use state::{LedgerEntry, MaterializedState};
pub use store::{StateStore, DEFAULT_PENDING_CAP};
pub use wal::{Wal, WalEntry};
