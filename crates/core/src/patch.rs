// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Candidate patches and per-tool diagnostics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Overfitting-oracle verdict attached to a patch.
///
/// `Correct` is the only label that survives the classifier gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[non_exhaustive]
pub enum PatchLabel {
    Correct,
    /// Satisfies the visible tests without being a general fix.
    Overfitting,
    Unknown,
}

crate::simple_display! {
    PatchLabel {
        Correct => "CORRECT",
        Overfitting => "OVERFITTING",
        Unknown => "UNKNOWN",
    }
}

/// A candidate fix emitted by a repair tool.
///
/// Created from one diff of a worker's invocation result; the classifier
/// attaches a label once; terminal after being recorded into the job
/// context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairPatch {
    /// Name of the repair tool that produced the diff.
    pub tool_name: String,
    /// Path of the buggy file the diff targets.
    pub file_path: PathBuf,
    /// Unified diff text.
    pub diff: String,
    /// Classifier verdict; `None` until classified.
    pub label: Option<PatchLabel>,
}

impl RepairPatch {
    pub fn new(tool_name: &str, file_path: impl Into<PathBuf>, diff: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            file_path: file_path.into(),
            diff: diff.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: PatchLabel) -> Self {
        self.label = Some(label);
        self
    }

    pub fn is_correct(&self) -> bool {
        self.label == Some(PatchLabel::Correct)
    }
}

/// One worker's summary record, serialized for downstream consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDiagnostic {
    pub success: bool,
    pub message: String,
    pub warning: String,
}

impl ToolDiagnostic {
    pub fn new(success: bool, message: impl Into<String>, warning: impl Into<String>) -> Self {
        Self { success, message: message.into(), warning: warning.into() }
    }

    /// Record for a worker that failed before producing a result.
    pub fn worker_failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), warning: String::new() }
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
