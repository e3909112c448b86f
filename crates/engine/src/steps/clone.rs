// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clone the project under repair into the workspace.

use crate::chain::{PipelineStep, StepOutcome};
use crate::error::EngineError;
use async_trait::async_trait;
use mend_adapters::GitWorkTree;
use mend_core::JobContext;

pub struct CloneRepository {
    url: String,
}

impl CloneRepository {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl PipelineStep for CloneRepository {
    fn name(&self) -> &str {
        "clone"
    }

    async fn run(&mut self, ctx: &mut JobContext) -> Result<StepOutcome, EngineError> {
        tracing::info!(url = %self.url, dest = %ctx.repo_path.display(), "cloning repository");
        GitWorkTree::clone_into(&self.url, &ctx.repo_path).await?;
        Ok(StepOutcome::success())
    }
}
