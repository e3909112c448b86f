// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compute the project's repair classpath.
//!
//! Asks the build tool to dump the dependency classpath into a scratch
//! file, parses it, and records the entries plus the compiled-classes
//! directory into the job context.

use super::log_tail;
use crate::chain::{PipelineStep, StepOutcome};
use crate::error::EngineError;
use async_trait::async_trait;
use mend_adapters::{BuildOutcome, BuildRunner};
use mend_core::JobContext;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

const CLASSPATH_GOAL: &str = "dependency:build-classpath";
const CLASSPATH_FILE: &str = ".mend-classpath.txt";

pub struct ComputeClasspath {
    runner: Arc<dyn BuildRunner>,
}

impl ComputeClasspath {
    pub fn new(runner: Arc<dyn BuildRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl PipelineStep for ComputeClasspath {
    fn name(&self) -> &str {
        "compute-classpath"
    }

    async fn run(&mut self, ctx: &mut JobContext) -> Result<StepOutcome, EngineError> {
        let out_file = ctx.repo_path.join(CLASSPATH_FILE);
        let mut properties = BTreeMap::new();
        properties.insert("mdep.outputFile".to_string(), out_file.display().to_string());

        if let BuildOutcome::Failure { log } =
            self.runner.run(CLASSPATH_GOAL, &properties).await?
        {
            return Ok(StepOutcome::failure(format!(
                "classpath goal failed: {}",
                log_tail(&log, 5)
            )));
        }

        let raw = tokio::fs::read_to_string(&out_file).await.unwrap_or_default();
        let _ = tokio::fs::remove_file(&out_file).await;

        let mut entries: Vec<PathBuf> = raw
            .trim()
            .split(':')
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        if entries.is_empty() {
            return Ok(StepOutcome::failure("classpath file missing or empty"));
        }
        let classes = ctx.repo_path.join("target/classes");
        if classes.is_dir() {
            entries.push(classes);
        }

        tracing::info!(entries = entries.len(), "computed repair classpath");
        ctx.repair_classpath = entries;
        Ok(StepOutcome::success())
    }
}
