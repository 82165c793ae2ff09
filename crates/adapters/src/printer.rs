// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform printer invocation (spec §4.3 `print` step, §6 external
//! collaborators). Success is a zero exit code from `lp` within the
//! configured timeout.

use crate::subprocess::{run_with_timeout, SubprocessError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
    #[error("printer rejected the job (exit {code:?}): {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
}

#[async_trait]
pub trait PrinterAdapter: Send + Sync + 'static {
    async fn print(
        &self,
        file: &Path,
        printer_name: &str,
        copies: u32,
        options: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<(), PrinterError>;
}

/// Invokes the system `lp` command (CUPS), present on Linux and macOS.
#[derive(Clone, Copy, Debug, Default)]
pub struct LpPrinterAdapter;

#[async_trait]
impl PrinterAdapter for LpPrinterAdapter {
    async fn print(
        &self,
        file: &Path,
        printer_name: &str,
        copies: u32,
        options: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<(), PrinterError> {
        let mut cmd = Command::new("lp");
        cmd.arg("-d").arg(printer_name);
        cmd.arg("-n").arg(copies.to_string());
        for (key, value) in options {
            cmd.arg("-o").arg(format!("{key}={value}"));
        }
        cmd.arg(file);

        let output = run_with_timeout(cmd, timeout, "lp").await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(PrinterError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    pub struct PrintCall {
        pub file: std::path::PathBuf,
        pub printer_name: String,
        pub copies: u32,
    }

    #[derive(Clone, Default)]
    pub struct FakePrinterAdapter {
        calls: Arc<Mutex<Vec<PrintCall>>>,
        fail_with: Arc<Mutex<Option<String>>>,
    }

    impl FakePrinterAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<PrintCall> {
            self.calls.lock().clone()
        }

        pub fn fail_next_with(&self, message: impl Into<String>) {
            *self.fail_with.lock() = Some(message.into());
        }
    }

    #[async_trait]
    impl PrinterAdapter for FakePrinterAdapter {
        async fn print(
            &self,
            file: &Path,
            printer_name: &str,
            copies: u32,
            _options: &BTreeMap<String, String>,
            _timeout: Duration,
        ) -> Result<(), PrinterError> {
            self.calls.lock().push(PrintCall {
                file: file.to_path_buf(),
                printer_name: printer_name.to_string(),
                copies,
            });
            if let Some(message) = self.fail_with.lock().take() {
                return Err(PrinterError::NonZeroExit { code: Some(1), stderr: message });
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePrinterAdapter, PrintCall};

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
