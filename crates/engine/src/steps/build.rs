// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build the checked-out project.

use super::log_tail;
use crate::chain::{PipelineStep, StepOutcome};
use crate::error::EngineError;
use async_trait::async_trait;
use mend_adapters::{BuildOutcome, BuildRunner};
use mend_core::JobContext;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct BuildProject {
    runner: Arc<dyn BuildRunner>,
    goal: String,
}

impl BuildProject {
    pub fn new(runner: Arc<dyn BuildRunner>) -> Self {
        Self { runner, goal: "test-compile".to_string() }
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }
}

#[async_trait]
impl PipelineStep for BuildProject {
    fn name(&self) -> &str {
        "build"
    }

    async fn run(&mut self, _ctx: &mut JobContext) -> Result<StepOutcome, EngineError> {
        match self.runner.run(&self.goal, &BTreeMap::new()).await? {
            BuildOutcome::Success => Ok(StepOutcome::success()),
            BuildOutcome::Failure { log } => Ok(StepOutcome::failure(format!(
                "build goal {} failed: {}",
                self.goal,
                log_tail(&log, 5)
            ))),
        }
    }
}
