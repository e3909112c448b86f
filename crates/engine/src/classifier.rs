// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classifier gate: overfitting filter over validated patches.

use mend_adapters::PatchClassifier;
use mend_core::RepairPatch;
use std::collections::HashSet;
use std::sync::Arc;

/// Runs surviving patches through the overfitting oracle and keeps only
/// those labelled CORRECT, in first-detected order.
pub struct ClassifierGate {
    classifier: Arc<dyn PatchClassifier>,
}

impl ClassifierGate {
    pub fn new(classifier: Arc<dyn PatchClassifier>) -> Self {
        Self { classifier }
    }

    /// Dedup identical diffs, classify, keep CORRECT.
    ///
    /// A classifier failure keeps no patches: an unlabelled patch is
    /// never recorded as a fix.
    pub async fn keep_correct(
        &self,
        patches: Vec<RepairPatch>,
        project_id: &str,
    ) -> Vec<RepairPatch> {
        let candidates = dedup_diffs(patches);
        if candidates.is_empty() {
            return candidates;
        }
        tracing::debug!(count = candidates.len(), "patches going into overfitting detection");
        match self.classifier.classify(candidates, project_id).await {
            Ok(labelled) => {
                for patch in &labelled {
                    tracing::debug!(
                        file = %patch.file_path.display(),
                        label = %patch.label.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string()),
                        "patch classified"
                    );
                }
                let correct: Vec<RepairPatch> =
                    labelled.into_iter().filter(|p| p.is_correct()).collect();
                tracing::debug!(
                    count = correct.len(),
                    "patches marked CORRECT by overfitting detection"
                );
                correct
            }
            Err(e) => {
                tracing::warn!(error = %e, "classifier failed; keeping no patches");
                Vec::new()
            }
        }
    }
}

/// Drop patches whose diff text duplicates an earlier one.
fn dedup_diffs(patches: Vec<RepairPatch>) -> Vec<RepairPatch> {
    let mut seen = HashSet::new();
    patches.into_iter().filter(|p| seen.insert(p.diff.clone())).collect()
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
