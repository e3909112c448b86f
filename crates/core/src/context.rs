// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared mutable state for one repair run.

use crate::patch::{RepairPatch, ToolDiagnostic};
use crate::status::StepStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Mutable record carried through the pipeline step chain for one
/// build/commit under repair.
///
/// Owned by the chain; read and written by every step in sequence. Steps
/// run strictly sequentially, so the context is never mutated
/// concurrently, even though a step's internal work may be.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobContext {
    /// Local checkout of the project under repair.
    pub repo_path: PathBuf,
    /// Scratch workspace for this run.
    pub workspace_path: PathBuf,
    /// Commit under repair, recorded at checkout.
    pub commit: Option<String>,
    /// Classpath entries computed by the preparatory steps.
    pub repair_classpath: Vec<PathBuf>,
    /// Source roots computed by the preparatory steps.
    pub repair_source_dirs: Vec<PathBuf>,
    /// Fully qualified names of the failing tests.
    pub failing_tests: Vec<String>,
    /// Raw build log of the failing test run.
    pub failure_log: String,
    /// One status per executed step, in execution order.
    pub step_statuses: Vec<StepStatus>,
    /// Recorded patches, append-only, capped per tool.
    pub patches: Vec<RepairPatch>,
    /// Per-tool diagnostic payloads, one record per attempted point.
    pub tool_diagnostics: BTreeMap<String, Vec<ToolDiagnostic>>,
    /// Set once a repair step records at least one patch.
    pub has_been_patched: bool,
}

impl JobContext {
    pub fn new(repo_path: impl Into<PathBuf>, workspace_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            workspace_path: workspace_path.into(),
            ..Self::default()
        }
    }

    /// Whether the repair step's inputs were computed by earlier steps.
    pub fn repair_inputs_ready(&self) -> bool {
        !self.repair_classpath.is_empty() && !self.repair_source_dirs.is_empty()
    }

    pub fn push_status(&mut self, status: StepStatus) {
        self.step_statuses.push(status);
    }

    /// Project identity used to key classifier runs: repo directory name
    /// plus the commit under repair.
    pub fn project_id(&self) -> String {
        let repo = self
            .repo_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());
        match &self.commit {
            Some(commit) => format!("{}-{}", repo, commit),
            None => repo,
        }
    }

    /// Append up to `cap` patches for `tool`, keeping first-detected order.
    ///
    /// Returns how many were recorded.
    pub fn record_patches(&mut self, patches: Vec<RepairPatch>, cap: usize) -> usize {
        let recorded = patches.len().min(cap);
        self.patches.extend(patches.into_iter().take(cap));
        recorded
    }

    pub fn record_tool_diagnostics(&mut self, tool: &str, diagnostics: Vec<ToolDiagnostic>) {
        self.tool_diagnostics.entry(tool.to_string()).or_default().extend(diagnostics);
    }

    pub fn set_patched(&mut self) {
        self.has_been_patched = true;
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
