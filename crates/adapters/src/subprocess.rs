// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with per-command timeouts.

use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Budget for ordinary git plumbing (branch, checkout, apply, reset).
pub const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);
/// Budget for git clone, which may fetch over the network.
pub const GIT_CLONE_TIMEOUT: Duration = Duration::from_secs(600);
/// Budget for docker lifecycle commands other than pull and wait.
pub const DOCKER_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);
/// Budget for docker pull; first-use image fetches are slow.
pub const DOCKER_PULL_TIMEOUT: Duration = Duration::from_secs(1800);
/// Budget for one build-tool invocation.
pub const BUILD_COMMAND_TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("{label}: failed to spawn: {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{label}: timed out after {timeout:?}")]
    TimedOut { label: String, timeout: Duration },
}

/// Run a command to completion with a timeout, capturing output.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    label: &str,
) -> Result<Output, SubprocessError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(SubprocessError::Spawn { label: label.to_string(), source }),
        Err(_) => Err(SubprocessError::TimedOut { label: label.to_string(), timeout }),
    }
}

/// Run a command to completion with no timeout.
///
/// Only for calls whose blocking time is governed elsewhere, such as
/// `docker wait` under the worker batch deadline.
pub async fn run(mut cmd: Command, label: &str) -> Result<Output, SubprocessError> {
    cmd.kill_on_drop(true);
    cmd.output()
        .await
        .map_err(|source| SubprocessError::Spawn { label: label.to_string(), source })
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
