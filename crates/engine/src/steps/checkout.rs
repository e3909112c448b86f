// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Check out the failing commit.

use crate::chain::{PipelineStep, StepOutcome};
use crate::error::EngineError;
use async_trait::async_trait;
use mend_adapters::GitWorkTree;
use mend_core::JobContext;

pub struct CheckoutCommit {
    commit: String,
}

impl CheckoutCommit {
    pub fn new(commit: impl Into<String>) -> Self {
        Self { commit: commit.into() }
    }
}

#[async_trait]
impl PipelineStep for CheckoutCommit {
    fn name(&self) -> &str {
        "checkout"
    }

    async fn run(&mut self, ctx: &mut JobContext) -> Result<StepOutcome, EngineError> {
        let git = GitWorkTree::open(&ctx.repo_path);
        git.checkout_commit(&self.commit).await?;
        ctx.commit = Some(self.commit.clone());
        Ok(StepOutcome::success())
    }
}
