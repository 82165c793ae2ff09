// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A change not yet eligible for stabilization (spec §4.2 step 2: "Record/
//! refresh a pending entry keyed by full path with `lastSeen = now`").

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct PendingEntry {
    pub last_seen: Instant,
}

impl PendingEntry {
    pub fn new(now: Instant) -> Self {
        Self { last_seen: now }
    }

    pub fn refresh(&mut self, now: Instant) {
        self.last_seen = now;
    }

    pub fn is_eligible(&self, now: Instant, debounce_ms: u64) -> bool {
        now.saturating_duration_since(self.last_seen) >= std::time::Duration::from_millis(debounce_ms)
    }
}
