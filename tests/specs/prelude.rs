// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared imports and fixtures for the specs.

pub use mend_adapters::{
    FakeBuild, FakeClassifier, FakeRuntime, FakeToolRun, GitWorkTree, MountMap,
};
pub use mend_core::{
    DetectorKind, JobContext, ModificationPoint, PatchLabel, RepairConfig, StatusKind,
};
pub use mend_engine::test_support::{ScriptedDetector, TempRepo};
pub use mend_engine::{
    detector_for, BuildProject, CheckoutCommit, CloneRepository, ComputeClasspath,
    ComputeSourceDir, GatherTestInfo, PatchTester, StepChain, ToolRepairStep, FAULT_REPORT_FILE,
    TOOL_NAME,
};
pub use std::collections::BTreeMap;
pub use std::sync::Arc;

pub const APP_JAVA: &str =
    "class App {\n    int add(int a, int b) {\n        return a - b;\n    }\n}\n";
pub const APP_JAVA_FIXED: &str =
    "class App {\n    int add(int a, int b) {\n        return a + b;\n    }\n}\n";

pub const SUREFIRE_FAILURE_LOG: &str = "\
[INFO] Running com.example.AppTest
testAdd(com.example.AppTest)  Time elapsed: 0.012 s  <<< FAILURE!
java.lang.AssertionError: expected:<3> but was:<-1>
\tat com.example.AppTest.testAdd(AppTest.java:17)
[INFO] Tests run: 1, Failures: 1, Errors: 0, Skipped: 0
[INFO] BUILD FAILURE
";

/// Repair config with a short batch deadline for specs.
pub fn spec_config() -> RepairConfig {
    RepairConfig { timeout: std::time::Duration::from_secs(30), ..RepairConfig::default() }
}

/// A context whose preparatory inputs are already computed.
pub fn ready_ctx(repo: &TempRepo) -> JobContext {
    let mut ctx = JobContext::new(repo.path(), repo.path());
    ctx.repair_classpath = vec![repo.path().join("target/classes")];
    ctx.repair_source_dirs = vec![repo.path().join("src/main/java")];
    ctx
}
