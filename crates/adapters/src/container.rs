// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime gateway.
//!
//! Thin capability over a container engine: ensure an image is present,
//! run a container with bind mounts, collect its output, remove it. The
//! [`DockerCli`] implementation shells out to the `docker` CLI; it is
//! stateless and safe to share across concurrent workers.

use crate::subprocess::{
    run, run_with_timeout, SubprocessError, DOCKER_COMMAND_TIMEOUT, DOCKER_PULL_TIMEOUT,
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
    #[error("docker {op} failed: {stderr}")]
    Command { op: &'static str, stderr: String },
    #[error("malformed docker {op} output: {detail}")]
    Malformed { op: &'static str, detail: String },
}

/// Opaque container identifier assigned by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host-path to container-path bind mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl BindMount {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self { source: source.into(), target: target.into() }
    }
}

/// Everything needed to create one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: String,
    pub binds: Vec<BindMount>,
    /// Command line run inside the container.
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerLogs {
    pub stdout: String,
    pub stderr: String,
}

/// One entry of a container's mount table, as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    /// Host-side path.
    pub source: PathBuf,
    /// Container-side path.
    pub destination: PathBuf,
}

/// Capability over a container engine.
///
/// Stateless and thread-safe; all sandboxed workers share one instance.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn image_present(&self, tag: &str) -> Result<bool, ContainerError>;
    async fn pull_image(&self, tag: &str) -> Result<(), ContainerError>;
    async fn create(&self, spec: &ContainerSpec) -> Result<ContainerId, ContainerError>;
    async fn start(&self, id: &ContainerId) -> Result<(), ContainerError>;
    /// Block until the container exits; returns its exit code.
    /// Unbounded: callers own the deadline.
    async fn wait(&self, id: &ContainerId) -> Result<i64, ContainerError>;
    async fn logs(&self, id: &ContainerId) -> Result<ContainerLogs, ContainerError>;
    async fn remove(&self, id: &ContainerId) -> Result<(), ContainerError>;
    /// The container's mount table, used for sibling-mount resolution.
    async fn mounts(&self, id: &ContainerId) -> Result<Vec<MountPoint>, ContainerError>;
}

/// Container runtime backed by the `docker` CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerCli;

impl DockerCli {
    pub fn new() -> Self {
        Self
    }

    async fn docker(
        &self,
        args: &[&str],
        timeout: Option<std::time::Duration>,
        op: &'static str,
    ) -> Result<Output, ContainerError> {
        let mut cmd = Command::new("docker");
        cmd.args(args);
        let output = match timeout {
            Some(timeout) => run_with_timeout(cmd, timeout, op).await?,
            None => run(cmd, op).await?,
        };
        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(ContainerError::Command { op, stderr })
        }
    }

    async fn docker_stdout(
        &self,
        args: &[&str],
        timeout: std::time::Duration,
        op: &'static str,
    ) -> Result<String, ContainerError> {
        let output = self.docker(args, Some(timeout), op).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn image_present(&self, tag: &str) -> Result<bool, ContainerError> {
        let stdout = self
            .docker_stdout(&["images", "-q", tag], DOCKER_COMMAND_TIMEOUT, "images")
            .await?;
        Ok(!stdout.is_empty())
    }

    async fn pull_image(&self, tag: &str) -> Result<(), ContainerError> {
        tracing::info!(%tag, "pulling container image");
        let start = std::time::Instant::now();
        self.docker(&["pull", tag], Some(DOCKER_PULL_TIMEOUT), "pull").await?;
        tracing::info!(%tag, elapsed_ms = start.elapsed().as_millis() as u64, "image pulled");
        Ok(())
    }

    async fn create(&self, spec: &ContainerSpec) -> Result<ContainerId, ContainerError> {
        let mut args: Vec<String> = vec!["create".to_string()];
        for bind in &spec.binds {
            args.push("-v".to_string());
            args.push(format!("{}:{}", bind.source.display(), bind.target.display()));
        }
        args.push(spec.image.clone());
        args.extend(spec.command.iter().cloned());
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let stdout = self.docker_stdout(&arg_refs, DOCKER_COMMAND_TIMEOUT, "create").await?;
        if stdout.is_empty() {
            return Err(ContainerError::Malformed {
                op: "create",
                detail: "no container id printed".to_string(),
            });
        }
        Ok(ContainerId::new(stdout))
    }

    async fn start(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.docker(&["start", id.as_str()], Some(DOCKER_COMMAND_TIMEOUT), "start").await?;
        Ok(())
    }

    async fn wait(&self, id: &ContainerId) -> Result<i64, ContainerError> {
        // blocks until the container exits; the worker batch deadline
        // governs how long anyone listens
        let output = self.docker(&["wait", id.as_str()], None, "wait").await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.trim().parse().map_err(|_| ContainerError::Malformed {
            op: "wait",
            detail: format!("expected exit code, got {:?}", stdout.trim()),
        })
    }

    async fn logs(&self, id: &ContainerId) -> Result<ContainerLogs, ContainerError> {
        let output =
            self.docker(&["logs", id.as_str()], Some(DOCKER_COMMAND_TIMEOUT), "logs").await?;
        Ok(ContainerLogs {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn remove(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.docker(&["rm", "-f", id.as_str()], Some(DOCKER_COMMAND_TIMEOUT), "rm").await?;
        Ok(())
    }

    async fn mounts(&self, id: &ContainerId) -> Result<Vec<MountPoint>, ContainerError> {
        let stdout = self
            .docker_stdout(
                &["inspect", "--format", "{{json .Mounts}}", id.as_str()],
                DOCKER_COMMAND_TIMEOUT,
                "inspect",
            )
            .await?;
        parse_mounts(&stdout)
    }
}

/// Parse the `docker inspect` mount table JSON.
pub(crate) fn parse_mounts(json: &str) -> Result<Vec<MountPoint>, ContainerError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ContainerError::Malformed {
            op: "inspect",
            detail: e.to_string(),
        })?;
    let entries = value.as_array().ok_or_else(|| ContainerError::Malformed {
        op: "inspect",
        detail: "mount table is not an array".to_string(),
    })?;
    let mut mounts = Vec::with_capacity(entries.len());
    for entry in entries {
        let source = entry.get("Source").and_then(|v| v.as_str());
        let destination = entry.get("Destination").and_then(|v| v.as_str());
        if let (Some(source), Some(destination)) = (source, destination) {
            mounts.push(MountPoint {
                source: PathBuf::from(source),
                destination: PathBuf::from(destination),
            });
        }
    }
    Ok(mounts)
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
