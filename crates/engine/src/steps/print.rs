// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `print` step (spec §4.3): hand the file to the platform printer
//! subsystem, an external collaborator behind [`cronplus_adapters::PrinterAdapter`].

use crate::context::ExecutionContext;
use crate::step_result::StepOutcome;
use cronplus_adapters::PrinterAdapter;
use cronplus_config::PrintStep;
use std::time::{Duration, Instant};

pub async fn execute(step: &PrintStep, ctx: &ExecutionContext, adapter: &dyn PrinterAdapter) -> StepOutcome {
    let started = Instant::now();
    let timeout = Duration::from_secs(step.timeout_seconds as u64);
    let options = step.options.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    let result = adapter.print(&ctx.file_path, &step.printer_name, step.copies, &options, timeout).await;
    match result {
        Ok(()) => StepOutcome::success(format!("sent to printer {}", step.printer_name), started.elapsed()),
        Err(error) => StepOutcome::failure(format!("print failed: {error}"), started.elapsed(), true),
    }
}

#[cfg(test)]
#[path = "print_tests.rs"]
mod tests;
