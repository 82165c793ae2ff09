// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cronplus-engine: the Execution Context, Variable Interpolator, per-kind
//! Action Steps, retry/timeout wrapper, and Pipeline Executor (spec §4.3,
//! §4.4, §4.5).

pub mod context;
pub mod error;
pub mod executor;
pub mod interpolate;
pub mod retry_exec;
pub mod step_interpolate;
pub mod step_result;
pub mod steps;

pub use context::ExecutionContext;
pub use error::EngineError;
pub use executor::{run, ExecutionResult, StepAdapters};
pub use step_result::StepOutcome;
