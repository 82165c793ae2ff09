// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable elapsed-time formatting, shared by CLI output and log lines.

use std::time::Duration;

/// Format a duration as `"1h23m"`, `"4m05s"`, `"12s"`, or `"340ms"`,
/// picking the coarsest pair of units that keeps the string readable.
pub fn format_elapsed(d: Duration) -> String {
    let total_ms = d.as_millis();
    if total_ms < 1000 {
        return format!("{}ms", total_ms);
    }
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h{:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m{:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Convenience wrapper for callers holding an epoch-millisecond elapsed value.
pub fn format_elapsed_ms(ms: u64) -> String {
    format_elapsed(Duration::from_millis(ms))
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
