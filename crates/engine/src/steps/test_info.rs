// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run the test goal and gather failing-test information.
//!
//! The build under repair is expected to fail here; a passing test run
//! means there is nothing to repair and the step reports a failure.

use crate::chain::{PipelineStep, StepOutcome};
use crate::error::EngineError;
use async_trait::async_trait;
use mend_adapters::{BuildOutcome, BuildRunner};
use mend_core::JobContext;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct GatherTestInfo {
    runner: Arc<dyn BuildRunner>,
}

impl GatherTestInfo {
    pub fn new(runner: Arc<dyn BuildRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl PipelineStep for GatherTestInfo {
    fn name(&self) -> &str {
        "gather-test-info"
    }

    async fn run(&mut self, ctx: &mut JobContext) -> Result<StepOutcome, EngineError> {
        match self.runner.run("test", &BTreeMap::new()).await? {
            BuildOutcome::Success => {
                Ok(StepOutcome::failure("test run passed; nothing to repair"))
            }
            BuildOutcome::Failure { log } => {
                ctx.failing_tests = parse_failing_tests(&log);
                tracing::info!(failing = ctx.failing_tests.len(), "gathered failing tests");
                ctx.failure_log = log;
                Ok(StepOutcome::success())
            }
        }
    }
}

/// Extract failing test names from a surefire-style build log.
///
/// Matches lines of the form
/// `testAdd(com.example.AppTest)  Time elapsed: 0.01 s  <<< FAILURE!`
/// and yields `com.example.AppTest#testAdd`, first occurrence wins.
pub(crate) fn parse_failing_tests(log: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in log.lines() {
        if !line.contains("<<< FAILURE!") && !line.contains("<<< ERROR!") {
            continue;
        }
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        let Some((method, rest)) = token.split_once('(') else {
            continue;
        };
        let class = rest.trim_end_matches(')');
        if method.is_empty() || class.is_empty() {
            continue;
        }
        let name = format!("{}#{}", class, method);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
#[path = "test_info_tests.rs"]
mod tests;
