// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observability event bus (spec §9 Design Note: "Object-level events...
//! replace with an observability bus: supervisors write structured events
//! to a channel; observers (logs, metrics, UI) consume"). A thin wrapper
//! over a bounded `tokio::sync::broadcast` channel of [`cronplus_core::Event`].
//! Best-effort and lossy under backpressure by design — this is a
//! notification stream, not a durability mechanism (that's
//! `cronplus-storage`'s job).

use cronplus_core::Event;
use tokio::sync::broadcast;

/// Default channel capacity. A slow or absent subscriber only drops its
/// own oldest unread events (`broadcast::error::RecvError::Lagged`); it
/// never blocks publishers.
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event. Returns the number of active subscribers that
    /// received it (zero is not an error — nobody may be listening).
    pub fn publish(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "observability_tests.rs"]
mod tests;
