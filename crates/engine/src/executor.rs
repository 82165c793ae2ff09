// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline Executor (spec §4.5): runs an ordered list of steps against a
//! single [`ExecutionContext`], honoring per-step conditions, interpolation,
//! retry/timeout, output propagation, and decision-driven jumps.

use crate::context::{ExecutionContext, StepLogEntry};
use crate::retry_exec::run_with_retry;
use crate::step_interpolate::interpolate_step;
use crate::steps::{archive, copy_move, decision, delete, http, print};
use cronplus_adapters::{HttpAdapter, PrinterAdapter};
use cronplus_conditions::{evaluate_all, BranchAction, DecisionAction};
use cronplus_config::{ConfigError, RetryPolicy, Step, StepKind};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// The adapters a pipeline run needs for its external-collaborator steps.
/// Held by reference so callers can share one pair across many executions.
pub struct StepAdapters<'a> {
    pub printer: &'a dyn PrinterAdapter,
    pub http: &'a dyn HttpAdapter,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub ok: bool,
    pub cancelled: bool,
    pub failing_step: Option<String>,
    pub error: Option<String>,
    pub log: Vec<StepLogEntry>,
}

impl ExecutionResult {
    fn success(ctx: &ExecutionContext) -> Self {
        Self { ok: true, cancelled: false, failing_step: None, error: None, log: ctx.log.clone() }
    }

    fn failure(ctx: &ExecutionContext, failing_step: Option<String>, error: String) -> Self {
        Self { ok: false, cancelled: false, failing_step, error: Some(error), log: ctx.log.clone() }
    }

    fn cancelled(ctx: &ExecutionContext, failing_step: Option<String>) -> Self {
        Self { ok: false, cancelled: true, failing_step, error: Some("cancelled".to_string()), log: ctx.log.clone() }
    }
}

/// Validates the pipeline independent of any task-level concerns (spec
/// §4.9, re-run "before each execution" in addition to apply-time).
fn validate_pipeline(pipeline: &[Step]) -> Result<(), ConfigError> {
    let mut seen = std::collections::HashSet::new();
    for step in pipeline {
        if let Some(name) = &step.name {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateStepName(name.clone()));
            }
        }
        step.validate()?;
    }
    cronplus_config::validate::validate_jump_graph(pipeline)
}

pub async fn run(
    pipeline: &[Step],
    ctx: &mut ExecutionContext,
    cancel: &CancellationToken,
    adapters: &StepAdapters<'_>,
) -> ExecutionResult {
    if let Err(error) = validate_pipeline(pipeline) {
        return ExecutionResult { ok: false, cancelled: false, failing_step: None, error: Some(error.to_string()), log: Vec::new() };
    }

    let name_to_index: HashMap<&str, usize> =
        pipeline.iter().enumerate().filter_map(|(i, s)| s.name.as_deref().map(|n| (n, i))).collect();

    let mut index = 0usize;
    while index < pipeline.len() {
        if cancel.is_cancelled() {
            return ExecutionResult::cancelled(ctx, pipeline[index].name.clone());
        }

        let step = &pipeline[index];
        if !step.enabled {
            index += 1;
            continue;
        }

        if let Some(gate) = &step.condition {
            let truthy = evaluate_all(&gate.conditions, gate.logic, &*ctx);
            let action = if truthy { gate.on_true } else { gate.on_false };
            match action {
                BranchAction::Continue => {}
                BranchAction::Skip => {
                    index += 1;
                    continue;
                }
                BranchAction::Stop => return ExecutionResult::success(ctx),
                BranchAction::Fail => {
                    return ExecutionResult::failure(ctx, step.name.clone(), "condition gate resolved to fail".to_string())
                }
            }
        }

        let interpolated = interpolate_step(step, ctx);
        let step_name = interpolated.name.clone().unwrap_or_else(|| format!("step[{index}]"));
        let started_at_ms = current_epoch_ms();
        let started = Instant::now();

        if let StepKind::Decision(decision_step) = &interpolated.kind {
            let (outcome, action) = decision::evaluate(decision_step, ctx);
            ctx.record(StepLogEntry {
                step_name: step_name.clone(),
                started_at_ms,
                ok: outcome.ok,
                message: outcome.message.clone(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
            match action {
                DecisionAction::Continue | DecisionAction::Skip => {
                    index += 1;
                    continue;
                }
                DecisionAction::Stop => return ExecutionResult::success(ctx),
                DecisionAction::Fail => return ExecutionResult::failure(ctx, Some(step_name), "decision resolved to fail".to_string()),
                DecisionAction::Jump { jump_target } => match name_to_index.get(jump_target.as_str()) {
                    Some(&target) => {
                        index = target;
                        continue;
                    }
                    None => return ExecutionResult::failure(ctx, Some(step_name), format!("jump target {jump_target:?} not found")),
                },
            }
        }

        let timeout = interpolated.timeout_seconds.map(|s| Duration::from_secs(s as u64));
        let retry_policy = interpolated.retry.clone().unwrap_or_default();
        let outcome = run_step_body(&interpolated.kind, ctx, cancel, adapters, &retry_policy, timeout).await;

        ctx.record(StepLogEntry {
            step_name: step_name.clone(),
            started_at_ms,
            ok: outcome.ok,
            message: outcome.message.clone(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        });
        ctx.merge_outputs(outcome.outputs);

        if !outcome.ok {
            if outcome.message == "cancelled" {
                return ExecutionResult::cancelled(ctx, Some(step_name));
            }
            return ExecutionResult::failure(ctx, Some(step_name), outcome.message);
        }

        index += 1;
    }

    ExecutionResult::success(ctx)
}

async fn run_step_body(
    kind: &StepKind,
    ctx: &ExecutionContext,
    cancel: &CancellationToken,
    adapters: &StepAdapters<'_>,
    retry_policy: &RetryPolicy,
    timeout: Option<Duration>,
) -> crate::step_result::StepOutcome {
    match kind {
        StepKind::Copy(s) => run_with_retry(retry_policy, timeout, cancel, || copy_move::execute(s, false, ctx, cancel)).await,
        StepKind::Move(s) => run_with_retry(retry_policy, timeout, cancel, || copy_move::execute(s, true, ctx, cancel)).await,
        StepKind::Archive(s) => run_with_retry(retry_policy, timeout, cancel, || archive::execute(s, ctx, cancel)).await,
        StepKind::Delete(s) => run_with_retry(retry_policy, timeout, cancel, || delete::execute(s, ctx)).await,
        StepKind::Print(s) => run_with_retry(retry_policy, timeout, cancel, || print::execute(s, ctx, adapters.printer)).await,
        StepKind::Http(s) => run_with_retry(retry_policy, timeout, cancel, || http::execute(s, ctx, adapters.http)).await,
        StepKind::Decision(_) => unreachable!("decision steps are handled before reaching run_step_body"),
    }
}

fn current_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
