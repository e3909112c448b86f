// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One sandboxed worker's invocation outcome.

use crate::patch::ToolDiagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of one containerized repair-tool invocation.
///
/// Owned by the worker pool until aggregation. A worker that fails
/// internally produces no result at all (the pool reports an absent
/// entry), so an instance of this type always describes a completed
/// invocation, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocationResult {
    /// The suspicious file handed to the tool.
    pub buggy_file: PathBuf,
    /// Per-candidate private output directory the tool wrote into.
    pub output_dir: PathBuf,
    pub stdout: String,
    pub stderr: String,
    /// True when the tool emitted at least one candidate diff.
    pub success: bool,
    pub message: String,
    pub warning: String,
    /// Unified diffs collected from the output directory.
    pub diffs: Vec<String>,
}

impl ToolInvocationResult {
    /// Build a result from the captured container output and the diffs
    /// found in the candidate's output directory.
    pub fn new(
        buggy_file: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        diffs: Vec<String>,
    ) -> Self {
        let stderr = stderr.into();
        let success = !diffs.is_empty();
        let message = if success {
            format!("{} candidate diff(s) produced", diffs.len())
        } else {
            "tool produced no diffs".to_string()
        };
        let warning = stderr.trim().to_string();
        Self {
            buggy_file: buggy_file.into(),
            output_dir: output_dir.into(),
            stdout: stdout.into(),
            stderr,
            success,
            message,
            warning,
            diffs,
        }
    }

    pub fn diagnostic(&self) -> ToolDiagnostic {
        ToolDiagnostic::new(self.success, self.message.clone(), self.warning.clone())
    }
}

#[cfg(test)]
#[path = "tool_result_tests.rs"]
mod tests;
