// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text/JSON output formatting: a `--output text|json` split so scripts
//! can consume the control surface without re-parsing human-formatted
//! tables.

use clap::ValueEnum;
use cronplus_wire::{DisabledTask, TaskSnapshot};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format-branch helper for non-list commands (`getConfig`, `ping`, ...).
pub fn format_or_json<T: Serialize>(format: OutputFormat, data: &T, text_fn: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => text_fn(),
    }
    Ok(())
}

pub fn print_tasks_snapshot(format: OutputFormat, tasks: &[TaskSnapshot]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tasks)?),
        OutputFormat::Text => {
            if tasks.is_empty() {
                println!("No tasks configured");
                return Ok(());
            }
            println!(
                "{:<20} {:<10} {:<10} {:>5} {:>9} {:>6} {:>7}",
                "ID", "STATUS", "ENABLED", "MAX", "PROCESSED", "ERRORS", "ACTIVE"
            );
            for task in tasks {
                println!(
                    "{:<20} {:<10} {:<10} {:>5} {:>9} {:>6} {:>7}",
                    task.id,
                    task.status,
                    task.enabled,
                    task.max_concurrent,
                    task.processed,
                    task.errors,
                    task.active_executions,
                );
                if let Some(reason) = &task.not_started_reason {
                    println!("  disabled: {reason}");
                }
            }
        }
    }
    Ok(())
}

pub fn print_applied(format: OutputFormat, added: usize, removed: usize, updated: usize, unchanged: usize, disabled: &[DisabledTask]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "added": added,
                "removed": removed,
                "updated": updated,
                "unchanged": unchanged,
                "disabled": disabled,
            });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
        OutputFormat::Text => {
            println!("added={added} removed={removed} updated={updated} unchanged={unchanged}");
            for task in disabled {
                println!("  disabled {}: {}", task.id, task.reason);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
