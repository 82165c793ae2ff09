// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filename glob filtering (spec §4.2 step 2, edge case "glob is exactly
//! `*` or empty matches everything").

use crate::error::WatcherError;
use glob::Pattern;

pub struct GlobFilter {
    pattern: Option<Pattern>,
}

impl GlobFilter {
    pub fn new(glob: &str) -> Result<Self, WatcherError> {
        if glob.is_empty() || glob == "*" {
            return Ok(Self { pattern: None });
        }
        let pattern = Pattern::new(glob)
            .map_err(|source| WatcherError::InvalidGlob { pattern: glob.to_string(), source })?;
        Ok(Self { pattern: Some(pattern) })
    }

    /// Matches against the event path's base filename, not the full path.
    pub fn matches(&self, path: &std::path::Path) -> bool {
        match &self.pattern {
            None => true,
            Some(pattern) => path.file_name().and_then(|n| n.to_str()).is_some_and(|name| pattern.matches(name)),
        }
    }
}

#[cfg(test)]
#[path = "glob_filter_tests.rs"]
mod tests;
