// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end repair specs with a real detection backend.
//!
//! The fault-report detector, worker pool, patch tester, and classifier
//! gate all run for real; only the container runtime, build tool, and
//! oracle are fakes.

use crate::prelude::*;

const APP_REL: &str = "src/main/java/App.java";

struct Rig {
    repo: TempRepo,
    runtime: FakeRuntime,
    build: FakeBuild,
    classifier: FakeClassifier,
}

impl Rig {
    fn new() -> Self {
        let repo = TempRepo::new();
        repo.write("pom.xml", "<project/>\n");
        repo.write(APP_REL, APP_JAVA);
        repo.commit_all("failing project");
        repo.write(
            FAULT_REPORT_FILE,
            &format!(r#"[{{"file": "{}", "line": 3, "suspiciousness": 0.9}}]"#, APP_REL),
        );
        Self {
            repo,
            runtime: FakeRuntime::new().with_image_present(),
            build: FakeBuild::new(),
            classifier: FakeClassifier::new(),
        }
    }

    fn step(&self) -> ToolRepairStep {
        let tester = Arc::new(PatchTester::new(
            GitWorkTree::open(self.repo.path()),
            Arc::new(self.build.clone()),
        ));
        let detector =
            detector_for(DetectorKind::FaultReport, tester, "test", BTreeMap::new(), 1);
        ToolRepairStep::new(
            spec_config(),
            Arc::new(self.runtime.clone()),
            MountMap::identity(),
            detector,
            Arc::new(self.classifier.clone()),
        )
    }
}

#[tokio::test]
async fn tool_diff_that_builds_and_classifies_correct_is_recorded() {
    let rig = Rig::new();
    let diff = rig.repo.diff_for(APP_REL, APP_JAVA_FIXED);
    rig.runtime.script("App.java", FakeToolRun::Diffs(vec![diff.clone()]));
    rig.classifier.push_labels(&[PatchLabel::Correct]);

    let mut ctx = ready_ctx(&rig.repo);
    StepChain::starting_with(rig.step()).execute(&mut ctx).await;

    assert_eq!(ctx.step_statuses.len(), 1);
    assert_eq!(ctx.step_statuses[0].kind, StatusKind::Success);
    assert_eq!(ctx.patches.len(), 1);
    assert_eq!(ctx.patches[0].tool_name, TOOL_NAME);
    assert_eq!(ctx.patches[0].diff, diff);
    assert!(ctx.patches[0].is_correct());
    assert!(ctx.has_been_patched);
    assert_eq!(ctx.tool_diagnostics[TOOL_NAME].len(), 1);
    assert!(ctx.tool_diagnostics[TOOL_NAME][0].success);

    // validation ran one build and left the checkout restored
    assert_eq!(rig.build.call_count(), 1);
    assert_eq!(rig.repo.current_branch(), "main");
    assert_eq!(rig.repo.branches(), vec!["main".to_string()]);
    let content = std::fs::read_to_string(rig.repo.path().join(APP_REL)).unwrap();
    assert_eq!(content, APP_JAVA);
}

#[tokio::test]
async fn diff_that_fails_its_build_is_not_recorded() {
    let rig = Rig::new();
    let diff = rig.repo.diff_for(APP_REL, APP_JAVA_FIXED);
    rig.runtime.script("App.java", FakeToolRun::Diffs(vec![diff]));
    rig.build.push_failure("BUILD FAILURE: 1 test failed");

    let mut ctx = ready_ctx(&rig.repo);
    StepChain::starting_with(rig.step()).execute(&mut ctx).await;

    assert_eq!(ctx.step_statuses[0].kind, StatusKind::PatchNotFound);
    assert!(ctx.patches.is_empty());
    assert!(!ctx.has_been_patched);
    assert_eq!(rig.repo.current_branch(), "main");
    assert_eq!(rig.repo.branches(), vec!["main".to_string()]);
}

#[tokio::test]
async fn overfitting_label_leaves_the_job_unpatched() {
    let rig = Rig::new();
    let diff = rig.repo.diff_for(APP_REL, APP_JAVA_FIXED);
    rig.runtime.script("App.java", FakeToolRun::Diffs(vec![diff]));
    rig.classifier.push_labels(&[PatchLabel::Overfitting]);

    let mut ctx = ready_ctx(&rig.repo);
    StepChain::starting_with(rig.step()).execute(&mut ctx).await;

    assert_eq!(ctx.step_statuses[0].kind, StatusKind::PatchNotFound);
    assert!(ctx.patches.is_empty());
    assert!(!ctx.has_been_patched);
}

#[tokio::test]
async fn tool_run_without_diffs_is_patch_not_found() {
    let rig = Rig::new();
    rig.runtime.script("App.java", FakeToolRun::Exit { code: 1, stderr: "no prediction".to_string() });

    let mut ctx = ready_ctx(&rig.repo);
    StepChain::starting_with(rig.step()).execute(&mut ctx).await;

    assert_eq!(ctx.step_statuses[0].kind, StatusKind::PatchNotFound);
    assert!(ctx.patches.is_empty());
    // no container leaked
    assert_eq!(rig.runtime.live_containers(), 0);
}
