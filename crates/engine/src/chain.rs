// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline step chain.
//!
//! Steps are linked in order and executed strictly sequentially over one
//! shared [`JobContext`]. The chain always completes with exactly one
//! status per configured step: an error inside a step's business logic
//! becomes a FAILURE status, and a step whose predecessor failed is
//! recorded SKIPPED without its business logic ever running.

use crate::error::EngineError;
use async_trait::async_trait;
use mend_core::{JobContext, StatusKind, StepStatus};

/// What a step's business logic reports back to the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    kind: StatusKind,
    diagnostic: Option<String>,
}

impl StepOutcome {
    pub fn success() -> Self {
        Self { kind: StatusKind::Success, diagnostic: None }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self { kind: StatusKind::Failure, diagnostic: Some(diagnostic.into()) }
    }

    pub fn skipped(diagnostic: impl Into<String>) -> Self {
        Self { kind: StatusKind::Skipped, diagnostic: Some(diagnostic.into()) }
    }

    /// Ran correctly, found nothing to fix.
    pub fn patch_not_found() -> Self {
        Self { kind: StatusKind::PatchNotFound, diagnostic: None }
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    fn into_status(self, step: &str) -> StepStatus {
        StepStatus { step: step.to_string(), kind: self.kind, diagnostic: self.diagnostic }
    }
}

/// A named unit of pipeline work, executed at most once.
#[async_trait]
pub trait PipelineStep: Send {
    fn name(&self) -> &str;

    /// Reentrant steps run even when an earlier step failed.
    fn runs_after_failure(&self) -> bool {
        false
    }

    /// Business logic. An `Err` is converted into a FAILURE status by the
    /// chain and never propagates further.
    async fn run(&mut self, ctx: &mut JobContext) -> Result<StepOutcome, EngineError>;
}

/// Ordered chain of pipeline steps (a linked list, not a DAG).
pub struct StepChain {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl StepChain {
    pub fn starting_with(step: impl PipelineStep + 'static) -> Self {
        Self { steps: vec![Box::new(step)] }
    }

    /// Builder-style linking: returns the chain for further appends.
    pub fn add_next_step(mut self, step: impl PipelineStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order, appending one status per step to the
    /// context. Consumes the chain; there is no retry at this layer.
    pub async fn execute(mut self, ctx: &mut JobContext) {
        let mut predecessor_failed = false;
        for step in &mut self.steps {
            let name = step.name().to_string();
            if predecessor_failed && !step.runs_after_failure() {
                tracing::info!(step = %name, "step skipped: a previous step failed");
                ctx.push_status(StepStatus::skipped(&name, "a previous step failed"));
                continue;
            }

            tracing::info!(step = %name, "step started");
            let start = std::time::Instant::now();
            let status = match step.run(ctx).await {
                Ok(outcome) => outcome.into_status(&name),
                Err(e) => StepStatus::failure(&name, e.to_string()),
            };
            let elapsed_ms = start.elapsed().as_millis() as u64;

            if status.kind == StatusKind::Failure {
                predecessor_failed = true;
                tracing::error!(
                    step = %name,
                    elapsed_ms,
                    diagnostic = status.diagnostic.as_deref().unwrap_or_default(),
                    "step failed"
                );
            } else {
                tracing::info!(step = %name, kind = %status.kind, elapsed_ms, "step finished");
            }
            ctx.push_status(status);
        }
    }
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod tests;
