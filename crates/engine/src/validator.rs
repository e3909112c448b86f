// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build-and-test validation of candidate patches.
//!
//! Each candidate is applied on a throwaway branch, built, and rolled
//! back. Branch and checkout state is global to a repository, so the
//! whole protocol runs under a mutex: two validations never interleave
//! on one checkout.

use crate::error::EngineError;
use mend_adapters::{BuildRunner, GitWorkTree};
use mend_core::RepairPatch;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const CANDIDATE_DIFF_FILE: &str = ".mend-candidate.diff";

/// Applies candidate patches on an isolated branch and reports whether
/// the project still builds and tests.
pub struct PatchTester {
    git: GitWorkTree,
    runner: Arc<dyn BuildRunner>,
    lock: Mutex<()>,
}

impl PatchTester {
    pub fn new(git: GitWorkTree, runner: Arc<dyn BuildRunner>) -> Self {
        Self { git, runner, lock: Mutex::new(()) }
    }

    /// Test one candidate: branch, apply, build, restore.
    ///
    /// Returns true only when the diff applies and the build goal
    /// succeeds. Every error anywhere in the protocol is a `false`
    /// verdict, never a propagating fault, and the working tree is
    /// restored to its pre-validation state on every path.
    pub async fn apply(
        &self,
        patch: &RepairPatch,
        goal: &str,
        properties: &BTreeMap<String, String>,
    ) -> bool {
        let _guard = self.lock.lock().await;
        tracing::info!(file = %patch.file_path.display(), "testing candidate patch");
        let start = std::time::Instant::now();
        let verdict = match self.apply_locked(patch, goal, properties).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(
                    file = %patch.file_path.display(),
                    error = %e,
                    "error while testing if patch is buildable"
                );
                false
            }
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(file = %patch.file_path.display(), verdict, elapsed_ms, "candidate patch tested");
        verdict
    }

    async fn apply_locked(
        &self,
        patch: &RepairPatch,
        goal: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<bool, EngineError> {
        let default_branch = self.git.current_branch().await?;
        let stem = patch
            .file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "patch".to_string());
        let branch = format!("{}-{}", stem, Uuid::new_v4());

        self.git.create_branch(&branch, &default_branch).await?;
        self.git.checkout(&branch).await?;

        let verdict = self.build_patched(patch, goal, properties).await;
        // restoration must run even when the build failed or errored
        self.restore(&default_branch, &branch).await;
        verdict
    }

    async fn build_patched(
        &self,
        patch: &RepairPatch,
        goal: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<bool, EngineError> {
        let diff_file = self.git.root().join(CANDIDATE_DIFF_FILE);
        tokio::fs::write(&diff_file, &patch.diff).await?;
        let applied = self.git.apply_patch(&diff_file).await;
        let _ = tokio::fs::remove_file(&diff_file).await;
        if !applied? {
            tracing::debug!(file = %patch.file_path.display(), "diff did not apply");
            return Ok(false);
        }
        let outcome = self.runner.run(goal, properties).await?;
        Ok(outcome.is_success())
    }

    /// Best-effort rollback: hard reset, back to the default branch,
    /// drop the throwaway branch. Each action is attempted regardless of
    /// the previous one's outcome.
    async fn restore(&self, default_branch: &str, branch: &str) {
        if let Err(e) = self.git.reset_hard().await {
            tracing::warn!(error = %e, "reset --hard failed during restore");
        }
        if let Err(e) = self.git.checkout(default_branch).await {
            tracing::warn!(error = %e, branch = default_branch, "checkout failed during restore");
        }
        if let Err(e) = self.git.delete_branch(branch).await {
            tracing::warn!(error = %e, branch, "branch delete failed during restore");
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
