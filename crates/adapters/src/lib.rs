// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External collaborators behind traits (spec §6): the platform printer
//! and the HTTP transport used by the `http` step. Real implementations
//! shell out or call `reqwest`; `Fake*` implementations (behind
//! `test-support`) let engine/daemon tests run without either.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod http;
pub mod printer;
pub mod subprocess;

pub use http::{HttpAdapter, HttpAdapterError, HttpRequest, HttpResponse, ReqwestHttpAdapter};
pub use printer::{LpPrinterAdapter, PrinterAdapter, PrinterError};
pub use subprocess::{run_with_timeout, SubprocessError};
