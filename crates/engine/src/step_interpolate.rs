// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applies the interpolator to a step's string/map fields before it runs
//! (spec §4.5 step c). Condition literals and enum fields are structural,
//! not interpolated.

use crate::context::ExecutionContext;
use crate::interpolate::{interpolate_map, interpolate_str};
use cronplus_config::{ArchiveStep, CopyStep, DeleteStep, HttpStep, PrintStep, Step, StepKind};

pub fn interpolate_step(step: &Step, ctx: &ExecutionContext) -> Step {
    let kind = match &step.kind {
        StepKind::Copy(s) => StepKind::Copy(interpolate_copy(s, ctx)),
        StepKind::Move(s) => StepKind::Move(interpolate_copy(s, ctx)),
        StepKind::Archive(s) => StepKind::Archive(interpolate_archive(s, ctx)),
        StepKind::Delete(s) => StepKind::Delete(interpolate_delete(s, ctx)),
        StepKind::Print(s) => StepKind::Print(interpolate_print(s, ctx)),
        StepKind::Http(s) => StepKind::Http(interpolate_http(s, ctx)),
        StepKind::Decision(s) => StepKind::Decision(s.clone()),
    };
    Step { kind, ..step.clone() }
}

fn interpolate_copy(step: &CopyStep, ctx: &ExecutionContext) -> CopyStep {
    CopyStep {
        destination: interpolate_str(&step.destination, ctx),
        rename_pattern: step.rename_pattern.as_ref().map(|p| interpolate_str(p, ctx)),
        ..step.clone()
    }
}

fn interpolate_archive(step: &ArchiveStep, ctx: &ExecutionContext) -> ArchiveStep {
    ArchiveStep { destination: interpolate_str(&step.destination, ctx), ..step.clone() }
}

fn interpolate_delete(step: &DeleteStep, ctx: &ExecutionContext) -> DeleteStep {
    DeleteStep { pattern: step.pattern.as_ref().map(|p| interpolate_str(p, ctx)), ..step.clone() }
}

fn interpolate_print(step: &PrintStep, ctx: &ExecutionContext) -> PrintStep {
    PrintStep {
        printer_name: interpolate_str(&step.printer_name, ctx),
        options: interpolate_map(&step.options, ctx),
        ..step.clone()
    }
}

fn interpolate_http(step: &HttpStep, ctx: &ExecutionContext) -> HttpStep {
    HttpStep {
        url: interpolate_str(&step.url, ctx),
        headers: interpolate_map(&step.headers, ctx),
        body: step.body.as_ref().map(|b| interpolate_str(b, ctx)),
        auth_token: step.auth_token.as_ref().map(|t| interpolate_str(t, ctx)),
        ..step.clone()
    }
}

#[cfg(test)]
#[path = "step_interpolate_tests.rs"]
mod tests;
