// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mend-engine: the patch-generation-and-validation engine.
//!
//! A [`StepChain`] carries one [`mend_core::JobContext`] through the
//! preparatory steps and into [`ToolRepairStep`], which detects
//! suspicious locations, fans them out to containerized repair workers,
//! validates every emitted diff on an isolated branch, and keeps only
//! patches the overfitting classifier labels CORRECT.

pub mod chain;
pub mod classifier;
pub mod detection;
pub mod error;
pub mod pool;
pub mod repair;
pub mod steps;
pub mod validator;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use chain::{PipelineStep, StepChain, StepOutcome};
pub use classifier::ClassifierGate;
pub use detection::{
    detector_for, DetectionStrategy, FaultReportDetector, StackTraceDetector, FAULT_REPORT_FILE,
};
pub use error::EngineError;
pub use pool::{ToolPool, WorkerOutcome};
pub use repair::{ToolRepairStep, TOOL_NAME};
pub use steps::{
    BuildProject, CheckoutCommit, CloneRepository, ComputeClasspath, ComputeSourceDir,
    GatherTestInfo,
};
pub use validator::PatchTester;

#[cfg(any(test, feature = "test-support"))]
pub use test_support::{DetectorProbe, ScriptedDetector, TempRepo};
