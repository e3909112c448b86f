// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandboxed repair worker pool.
//!
//! Fans modification points out to concurrent containerized tool runs,
//! bounded by the configured worker count, and collects results against
//! a single batch deadline. One bad candidate never fails the batch: a
//! worker that errors contributes an absent result and everything else
//! proceeds.

use crate::error::EngineError;
use mend_adapters::{BindMount, ContainerRuntime, ContainerSpec, MountMap};
use mend_core::{ModificationPoint, RepairConfig, ToolInvocationResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// Entry point of the repair tool inside its image.
const TOOL_COMMAND: &str = "./sequencer-predict.sh";
/// Model weights baked into the tool image.
const MODELS_DIR: &str = "/root/sequencer/models";
/// Container-side mount of the buggy file's parent directory.
const INPUT_MOUNT: &str = "/in";
/// Container-side mount of the candidate's private output directory.
const OUTPUT_MOUNT: &str = "/out";

/// One worker's contribution to the aggregate.
///
/// `result` is `None` when the worker failed internally; the point is
/// kept so diagnostics can still name it. Results are always paired with
/// their originating point, never cross-assigned.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub point: ModificationPoint,
    pub result: Option<ToolInvocationResult>,
}

/// Bounded pool of containerized repair-tool workers.
pub struct ToolPool {
    runtime: Arc<dyn ContainerRuntime>,
    config: RepairConfig,
    mounts: MountMap,
}

impl ToolPool {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: RepairConfig, mounts: MountMap) -> Self {
        Self { runtime, config, mounts }
    }

    /// Ensure the tool image is present, pulling on first use.
    ///
    /// Checked once per batch, before fan-out, so concurrent workers
    /// never trigger duplicate pulls. An error here is an infrastructure
    /// failure: the whole repair step aborts rather than partially
    /// running.
    pub async fn ensure_image(&self) -> Result<(), EngineError> {
        if !self.runtime.image_present(&self.config.docker_tag).await? {
            self.runtime.pull_image(&self.config.docker_tag).await?;
        }
        Ok(())
    }

    /// Run one worker per point, at most `threads` concurrently, and
    /// collect whatever completes before the batch deadline.
    ///
    /// Workers past the deadline are abandoned, not force-killed: they
    /// keep running until their own blocking calls return and remove
    /// their containers best-effort on the way out. A wedged runtime can
    /// therefore leak a container; nothing waits for the stragglers.
    pub async fn run_batch(
        &self,
        repo: &Path,
        patch_dir: &Path,
        points: Vec<ModificationPoint>,
    ) -> Vec<WorkerOutcome> {
        let total = points.len();
        let deadline = tokio::time::Instant::now() + self.config.timeout;
        let semaphore = Arc::new(Semaphore::new(self.config.threads.max(1)));
        let (tx, mut rx) = mpsc::channel(total.max(1));

        for point in points {
            let semaphore = semaphore.clone();
            let tx = tx.clone();
            let runtime = self.runtime.clone();
            let mounts = self.mounts.clone();
            let repo = repo.to_path_buf();
            let patch_dir = patch_dir.to_path_buf();
            let docker_tag = self.config.docker_tag.clone();
            let beam_size = self.config.beam_size;
            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let result = match invoke_tool(
                    runtime.as_ref(),
                    &mounts,
                    &docker_tag,
                    beam_size,
                    &repo,
                    &patch_dir,
                    &point,
                )
                .await
                {
                    Ok(result) => Some(result),
                    Err(e) => {
                        tracing::warn!(
                            file = %point.file_path.display(),
                            line = point.line,
                            error = %e,
                            "repair worker failed; dropping candidate"
                        );
                        None
                    }
                };
                let _ = tx.send(WorkerOutcome { point, result }).await;
            });
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(total);
        loop {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(outcome)) => outcomes.push(outcome),
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        completed = outcomes.len(),
                        total,
                        "batch deadline elapsed; abandoning outstanding workers"
                    );
                    break;
                }
            }
        }
        outcomes
    }
}

/// One containerized tool invocation over one modification point.
async fn invoke_tool(
    runtime: &dyn ContainerRuntime,
    mounts: &MountMap,
    docker_tag: &str,
    beam_size: u32,
    repo: &Path,
    patch_dir: &Path,
    point: &ModificationPoint,
) -> Result<ToolInvocationResult, EngineError> {
    let buggy_file = tokio::fs::canonicalize(&point.file_path).await?;
    let parent = buggy_file
        .parent()
        .ok_or_else(|| EngineError::Other(format!("{} has no parent", buggy_file.display())))?
        .to_path_buf();
    let file_name = buggy_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| EngineError::Other(format!("{} has no file name", buggy_file.display())))?;

    // per-candidate output dir: file name + identity hash keeps two
    // workers on the same file from colliding
    let output_dir = patch_dir.join(format!("{}{}", file_name, point.identity()));
    tokio::fs::create_dir_all(&output_dir).await?;
    let output_dir = tokio::fs::canonicalize(&output_dir).await?;

    let repo_real = tokio::fs::canonicalize(repo).await.unwrap_or_else(|_| repo.to_path_buf());
    let real_path = buggy_file.strip_prefix(&repo_real).unwrap_or(&buggy_file).to_path_buf();

    let tool_cmd = format!(
        "{} --buggy_file={}/{} --buggy_line={} --beam_size={} --real_file_path={} --output={} --models_dir={}",
        TOOL_COMMAND,
        INPUT_MOUNT,
        file_name,
        point.line,
        beam_size,
        real_path.display(),
        OUTPUT_MOUNT,
        MODELS_DIR,
    );

    // bind sources must be host paths when running nested
    let spec = ContainerSpec {
        image: docker_tag.to_string(),
        binds: vec![
            BindMount::new(mounts.resolve(&parent), INPUT_MOUNT),
            BindMount::new(mounts.resolve(&output_dir), OUTPUT_MOUNT),
        ],
        command: vec!["bash".to_string(), "-c".to_string(), tool_cmd],
    };

    let id = runtime.create(&spec).await?;
    let ran = async {
        runtime.start(&id).await?;
        let exit = runtime.wait(&id).await?;
        let logs = runtime.logs(&id).await?;
        Ok::<_, EngineError>((exit, logs))
    }
    .await;
    // the container goes away regardless of how the run went
    if let Err(e) = runtime.remove(&id).await {
        tracing::warn!(container = %id, error = %e, "container remove failed");
    }
    let (exit, logs) = ran?;
    tracing::debug!(container = %id, exit, file = %buggy_file.display(), "tool container finished");

    let diffs = collect_diffs(&output_dir).await?;
    Ok(ToolInvocationResult::new(buggy_file, output_dir, logs.stdout, logs.stderr, diffs))
}

/// Read `*.diff` files from a worker's output directory, in name order.
async fn collect_diffs(output_dir: &Path) -> Result<Vec<String>, EngineError> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(output_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "diff") {
            files.push(path);
        }
    }
    files.sort();
    let mut diffs = Vec::with_capacity(files.len());
    for path in files {
        diffs.push(tokio::fs::read_to_string(&path).await?);
    }
    Ok(diffs)
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
