// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locate the project's source roots.
//!
//! Checks the conventional Maven layout at the project root and one
//! level of modules below it.

use crate::chain::{PipelineStep, StepOutcome};
use crate::error::EngineError;
use async_trait::async_trait;
use mend_core::JobContext;
use std::path::PathBuf;

const SOURCE_ROOT: &str = "src/main/java";

pub struct ComputeSourceDir;

impl ComputeSourceDir {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ComputeSourceDir {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for ComputeSourceDir {
    fn name(&self) -> &str {
        "compute-source-dir"
    }

    async fn run(&mut self, ctx: &mut JobContext) -> Result<StepOutcome, EngineError> {
        let mut dirs: Vec<PathBuf> = Vec::new();

        let root_sources = ctx.repo_path.join(SOURCE_ROOT);
        if root_sources.is_dir() {
            dirs.push(root_sources);
        }

        let mut entries = tokio::fs::read_dir(&ctx.repo_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            let module_sources = entry.path().join(SOURCE_ROOT);
            if module_sources.is_dir() {
                dirs.push(module_sources);
            }
        }

        if dirs.is_empty() {
            return Ok(StepOutcome::failure("no source directories found"));
        }
        dirs.sort();
        dirs.dedup();
        tracing::info!(dirs = dirs.len(), "computed source directories");
        ctx.repair_source_dirs = dirs;
        Ok(StepOutcome::success())
    }
}
