// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The repair step: detection, sandboxed generation, validation,
//! classification, recording.
//!
//! Only missing preconditions and infrastructure failures produce a
//! non-SUCCESS status here; every per-candidate problem is absorbed and
//! merely shrinks the set of recorded patches. The step never returns an
//! error past its boundary.

use crate::chain::{PipelineStep, StepOutcome};
use crate::classifier::ClassifierGate;
use crate::detection::DetectionStrategy;
use crate::error::EngineError;
use crate::pool::ToolPool;
use async_trait::async_trait;
use mend_adapters::{ContainerRuntime, MountMap, PatchClassifier};
use mend_core::{JobContext, RepairConfig, RepairPatch, ToolDiagnostic};
use std::path::Path;
use std::sync::Arc;

/// Name this tool's patches and diagnostics are recorded under.
pub const TOOL_NAME: &str = "sequencer";

pub struct ToolRepairStep {
    config: RepairConfig,
    detector: Box<dyn DetectionStrategy>,
    pool: ToolPool,
    gate: ClassifierGate,
}

impl ToolRepairStep {
    pub fn new(
        config: RepairConfig,
        runtime: Arc<dyn ContainerRuntime>,
        mounts: MountMap,
        detector: Box<dyn DetectionStrategy>,
        classifier: Arc<dyn PatchClassifier>,
    ) -> Self {
        let pool = ToolPool::new(runtime, config.clone(), mounts);
        Self { config, detector, pool, gate: ClassifierGate::new(classifier) }
    }
}

#[async_trait]
impl PipelineStep for ToolRepairStep {
    fn name(&self) -> &str {
        "repair"
    }

    async fn run(&mut self, ctx: &mut JobContext) -> Result<StepOutcome, EngineError> {
        if !ctx.repair_inputs_ready() {
            return Ok(StepOutcome::skipped("classpath or source directories not computed"));
        }

        self.detector.setup(&ctx.repo_path, &ctx.repo_path.join("pom.xml"));
        let points = self.detector.detect(ctx).await;
        if points.is_empty() {
            tracing::info!("no suspicious modification points detected");
            return Ok(StepOutcome::patch_not_found());
        }
        tracing::info!(points = points.len(), tag = %self.config.docker_tag, "starting sandboxed repair");

        if let Err(e) = self.pool.ensure_image().await {
            return Ok(StepOutcome::skipped(format!(
                "error while retrieving the repair tool image: {}",
                e
            )));
        }

        let patch_dir = ctx.repo_path.join(format!("mend.{}.results", TOOL_NAME));
        if let Err(e) = tokio::fs::create_dir_all(&patch_dir).await {
            return Ok(StepOutcome::skipped(format!(
                "could not create patch directory {}: {}",
                patch_dir.display(),
                e
            )));
        }

        let outcomes = self.pool.run_batch(&ctx.repo_path, &patch_dir, points).await;

        let mut diagnostics = Vec::with_capacity(outcomes.len());
        let mut candidates: Vec<RepairPatch> = Vec::new();
        for outcome in &outcomes {
            match &outcome.result {
                Some(result) => {
                    diagnostics.push(result.diagnostic());
                    for diff in &result.diffs {
                        let patch = RepairPatch::new(TOOL_NAME, result.buggy_file.clone(), diff.clone());
                        if self.detector.validate(&patch).await {
                            candidates.push(patch);
                        } else {
                            tracing::debug!(
                                file = %result.buggy_file.display(),
                                "candidate diff rejected"
                            );
                        }
                    }
                }
                None => diagnostics.push(ToolDiagnostic::worker_failed(format!(
                    "repair tool failed for {}:{}",
                    outcome.point.file_path.display(),
                    outcome.point.line
                ))),
            }
        }

        if candidates.is_empty() {
            remove_patch_dir(&patch_dir).await;
            return Ok(StepOutcome::patch_not_found());
        }

        let correct = self.gate.keep_correct(candidates, &ctx.project_id()).await;
        if correct.is_empty() {
            remove_patch_dir(&patch_dir).await;
            return Ok(StepOutcome::patch_not_found());
        }

        let recorded = ctx.record_patches(correct, self.config.max_patches_per_tool);
        ctx.record_tool_diagnostics(TOOL_NAME, diagnostics);
        ctx.set_patched();
        remove_patch_dir(&patch_dir).await;
        tracing::info!(recorded, "repair step recorded patches");
        Ok(StepOutcome::success())
    }
}

/// Scratch diffs live under the repo; sweep them once results are
/// recorded. Best-effort.
async fn remove_patch_dir(patch_dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(patch_dir).await {
        tracing::warn!(dir = %patch_dir.display(), error = %e, "patch directory not removed");
    }
}

#[cfg(test)]
#[path = "repair_tests.rs"]
mod tests;
