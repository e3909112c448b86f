// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overfitting classification of candidate patches.
//!
//! The oracle itself is an external collaborator: a trained model behind
//! an executable. This adapter only ships patches out and labels back;
//! what the model does is a black box.

use crate::subprocess::{run_with_timeout, SubprocessError};
use async_trait::async_trait;
use mend_core::{PatchLabel, RepairPatch};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Budget for one oracle invocation over a whole patch set.
const CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
    #[error("classifier exited nonzero: {stderr}")]
    Command { stderr: String },
    #[error("malformed classifier output: {0}")]
    Malformed(String),
    #[error("classifier scratch file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Attaches an overfitting label to every candidate patch.
///
/// Deterministic given identical inputs and oracle state; the returned
/// list preserves input order.
#[async_trait]
pub trait PatchClassifier: Send + Sync {
    async fn classify(
        &self,
        patches: Vec<RepairPatch>,
        project_id: &str,
    ) -> Result<Vec<RepairPatch>, ClassifierError>;
}

#[derive(Serialize)]
struct PatchRecord<'a> {
    file_path: String,
    diff: &'a str,
}

/// Classifier backed by an external oracle executable.
///
/// Patches are handed over as a JSON file; the oracle prints one label
/// per patch, as a JSON array, in input order.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    command: PathBuf,
}

impl CommandClassifier {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self { command: command.into() }
    }
}

#[async_trait]
impl PatchClassifier for CommandClassifier {
    async fn classify(
        &self,
        patches: Vec<RepairPatch>,
        project_id: &str,
    ) -> Result<Vec<RepairPatch>, ClassifierError> {
        if patches.is_empty() {
            return Ok(patches);
        }

        let records: Vec<PatchRecord<'_>> = patches
            .iter()
            .map(|p| PatchRecord {
                file_path: p.file_path.display().to_string(),
                diff: &p.diff,
            })
            .collect();
        let payload = serde_json::to_string(&records)
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        let scratch = std::env::temp_dir().join(format!("mend-patches-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&scratch, payload).await?;

        let mut cmd = Command::new(&self.command);
        cmd.arg("--patches").arg(&scratch).arg("--project").arg(project_id);
        let result = run_with_timeout(cmd, CLASSIFIER_TIMEOUT, "classifier").await;
        if let Err(e) = tokio::fs::remove_file(&scratch).await {
            tracing::warn!(file = %scratch.display(), error = %e, "classifier scratch file not removed");
        }
        let output = result?;

        if !output.status.success() {
            return Err(ClassifierError::Command {
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let labels: Vec<PatchLabel> = serde_json::from_slice(&output.stdout)
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;
        if labels.len() != patches.len() {
            return Err(ClassifierError::Malformed(format!(
                "{} labels for {} patches",
                labels.len(),
                patches.len()
            )));
        }

        Ok(patches
            .into_iter()
            .zip(labels)
            .map(|(patch, label)| patch.with_label(label))
            .collect())
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
