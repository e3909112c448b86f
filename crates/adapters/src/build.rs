// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build-tool execution: run a goal, get pass/fail.

use crate::subprocess::{run_with_timeout, SubprocessError, BUILD_COMMAND_TIMEOUT};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
}

/// Verdict of one build-tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// All goals succeeded.
    Success,
    /// Some goal failed; carries the build log for diagnosis.
    Failure { log: String },
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success)
    }

    pub fn log(&self) -> &str {
        match self {
            BuildOutcome::Success => "",
            BuildOutcome::Failure { log } => log,
        }
    }
}

/// Capability over the project's build tool.
#[async_trait]
pub trait BuildRunner: Send + Sync {
    /// Run one goal with the given `-D`-style properties.
    async fn run(
        &self,
        goal: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<BuildOutcome, BuildError>;
}

/// Build runner invoking the Maven CLI against one project descriptor.
#[derive(Debug, Clone)]
pub struct MavenCli {
    pom: PathBuf,
}

impl MavenCli {
    pub fn new(pom: impl Into<PathBuf>) -> Self {
        Self { pom: pom.into() }
    }
}

/// Assemble the mvn argument vector for one invocation.
fn mvn_args(pom: &PathBuf, goal: &str, properties: &BTreeMap<String, String>) -> Vec<String> {
    let mut args = vec![
        "-B".to_string(),
        "-f".to_string(),
        pom.display().to_string(),
        goal.to_string(),
    ];
    for (key, value) in properties {
        args.push(format!("-D{}={}", key, value));
    }
    args
}

#[async_trait]
impl BuildRunner for MavenCli {
    async fn run(
        &self,
        goal: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<BuildOutcome, BuildError> {
        let args = mvn_args(&self.pom, goal, properties);
        tracing::info!(%goal, pom = %self.pom.display(), "running build goal");
        let start = std::time::Instant::now();

        let mut cmd = Command::new("mvn");
        cmd.args(&args);
        if let Some(dir) = self.pom.parent() {
            cmd.current_dir(dir);
        }
        let output = run_with_timeout(cmd, BUILD_COMMAND_TIMEOUT, "mvn").await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if output.status.success() {
            tracing::info!(%goal, elapsed_ms, "build goal succeeded");
            Ok(BuildOutcome::Success)
        } else {
            tracing::info!(%goal, elapsed_ms, "build goal failed");
            let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                log.push('\n');
                log.push_str(stderr.trim_end());
            }
            Ok(BuildOutcome::Failure { log })
        }
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
