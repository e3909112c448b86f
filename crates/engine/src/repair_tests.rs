// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::ScriptedDetector;
use mend_adapters::{FakeClassifier, FakeRuntime, FakeToolRun};
use mend_core::{ModificationPoint, PatchLabel, StatusKind};

struct Harness {
    dir: tempfile::TempDir,
    runtime: FakeRuntime,
    classifier: FakeClassifier,
}

impl Harness {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            runtime: FakeRuntime::new().with_image_present(),
            classifier: FakeClassifier::new(),
        }
    }

    fn ctx_ready(&self) -> JobContext {
        let mut ctx = JobContext::new(self.dir.path(), self.dir.path());
        ctx.repair_classpath = vec![self.dir.path().join("target/classes")];
        ctx.repair_source_dirs = vec![self.dir.path().join("src/main/java")];
        ctx
    }

    fn point(&self, file: &str, line: u32) -> ModificationPoint {
        let path = self.dir.path().join(file);
        std::fs::write(&path, "class X {}\n").unwrap();
        ModificationPoint::new(path, line, vec!["class X {}".to_string()])
    }

    fn step(&self, detector: ScriptedDetector) -> ToolRepairStep {
        let config = RepairConfig {
            timeout: std::time::Duration::from_secs(30),
            ..RepairConfig::default()
        };
        ToolRepairStep::new(
            config,
            Arc::new(self.runtime.clone()),
            MountMap::identity(),
            Box::new(detector),
            Arc::new(self.classifier.clone()),
        )
    }
}

#[tokio::test]
async fn missing_inputs_skip_without_any_detection_or_container_work() {
    let h = Harness::new();
    let detector = ScriptedDetector::new(vec![h.point("A.java", 1)]);
    let probe = detector.probe();
    let mut step = h.step(detector);

    let mut ctx = JobContext::new(h.dir.path(), h.dir.path());
    let outcome = step.run(&mut ctx).await.unwrap();

    assert_eq!(outcome.kind(), StatusKind::Skipped);
    assert_eq!(probe.detect_calls(), 0);
    assert_eq!(h.runtime.created_count(), 0);
}

#[tokio::test]
async fn empty_detection_is_patch_not_found_without_pool_work() {
    let h = Harness::new();
    let detector = ScriptedDetector::new(Vec::new());
    let mut step = h.step(detector);

    let mut ctx = h.ctx_ready();
    let outcome = step.run(&mut ctx).await.unwrap();

    assert_eq!(outcome.kind(), StatusKind::PatchNotFound);
    assert_eq!(h.runtime.created_count(), 0);
    assert!(ctx.patches.is_empty());
    assert!(!ctx.has_been_patched);
}

#[tokio::test]
async fn image_retrieval_failure_skips_the_whole_step() {
    let h = Harness::new();
    let runtime = FakeRuntime::new().fail_pull("registry unreachable");
    let detector = ScriptedDetector::new(vec![h.point("A.java", 1)]);
    let config = RepairConfig::default();
    let mut step = ToolRepairStep::new(
        config,
        Arc::new(runtime.clone()),
        MountMap::identity(),
        Box::new(detector),
        Arc::new(h.classifier.clone()),
    );

    let mut ctx = h.ctx_ready();
    let outcome = step.run(&mut ctx).await.unwrap();

    assert_eq!(outcome.kind(), StatusKind::Skipped);
    assert_eq!(runtime.created_count(), 0);
}

#[tokio::test]
async fn full_batch_records_correct_patches_and_per_point_diagnostics() {
    let h = Harness::new();
    // 6 points; 5 workers emit 2 diffs each, 1 crashes
    let names = ["A", "B", "C", "D", "E"];
    let mut points = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let file = format!("{}.java", name);
        points.push(h.point(&file, i as u32 + 1));
        h.runtime.script(
            &file,
            FakeToolRun::Diffs(vec![format!("diff-{}-1", name), format!("diff-{}-2", name)]),
        );
    }
    points.push(h.point("F.java", 6));
    h.runtime.script("F.java", FakeToolRun::FailStart("tool crashed".to_string()));

    // detector rejects 2 of the 10 diffs, classifier marks 3 of 8 CORRECT
    let detector =
        ScriptedDetector::new(points).rejecting("diff-A-2").rejecting("diff-B-1");
    h.classifier.push_labels(&[
        PatchLabel::Correct,
        PatchLabel::Overfitting,
        PatchLabel::Correct,
        PatchLabel::Unknown,
        PatchLabel::Correct,
        PatchLabel::Overfitting,
        PatchLabel::Unknown,
        PatchLabel::Unknown,
    ]);
    let mut step = h.step(detector);

    let mut ctx = h.ctx_ready();
    let outcome = step.run(&mut ctx).await.unwrap();

    assert_eq!(outcome.kind(), StatusKind::Success);
    assert_eq!(ctx.patches.len(), 3);
    assert!(ctx.patches.iter().all(|p| p.is_correct() && p.tool_name == TOOL_NAME));
    assert!(ctx.has_been_patched);

    let diagnostics = &ctx.tool_diagnostics[TOOL_NAME];
    assert_eq!(diagnostics.len(), 6);
    assert_eq!(diagnostics.iter().filter(|d| !d.success).count(), 1);

    // classifier saw the 8 validated diffs, keyed by project identity
    assert_eq!(h.classifier.calls().len(), 1);
    assert_eq!(h.classifier.calls()[0].0, 8);

    // scratch patch directory swept after recording
    assert!(!h.dir.path().join(format!("mend.{}.results", TOOL_NAME)).exists());
}

#[tokio::test]
async fn zero_correct_labels_is_patch_not_found_with_flag_unset() {
    let h = Harness::new();
    let points = vec![h.point("A.java", 1)];
    h.runtime.script("A.java", FakeToolRun::Diffs(vec!["diff-A".to_string()]));
    h.classifier.push_labels(&[PatchLabel::Overfitting]);
    let mut step = h.step(ScriptedDetector::new(points));

    let mut ctx = h.ctx_ready();
    let outcome = step.run(&mut ctx).await.unwrap();

    assert_eq!(outcome.kind(), StatusKind::PatchNotFound);
    assert!(ctx.patches.is_empty());
    assert!(!ctx.has_been_patched);
    assert!(ctx.tool_diagnostics.is_empty());
}

#[tokio::test]
async fn all_diffs_rejected_by_detector_is_patch_not_found() {
    let h = Harness::new();
    let points = vec![h.point("A.java", 1)];
    h.runtime.script("A.java", FakeToolRun::Diffs(vec!["diff-A".to_string()]));
    let detector = ScriptedDetector::new(points).rejecting("diff-A");
    let mut step = h.step(detector);

    let mut ctx = h.ctx_ready();
    let outcome = step.run(&mut ctx).await.unwrap();

    assert_eq!(outcome.kind(), StatusKind::PatchNotFound);
    assert!(h.classifier.calls().is_empty());
}

#[tokio::test]
async fn recorded_patches_are_capped_per_tool() {
    let h = Harness::new();
    let points = vec![h.point("A.java", 1)];
    let diffs: Vec<String> = (0..50).map(|i| format!("diff-{:02}", i)).collect();
    h.runtime.script("A.java", FakeToolRun::Diffs(diffs));
    h.classifier.push_labels(&[PatchLabel::Correct; 50]);
    let mut step = h.step(ScriptedDetector::new(points));

    let mut ctx = h.ctx_ready();
    let outcome = step.run(&mut ctx).await.unwrap();

    assert_eq!(outcome.kind(), StatusKind::Success);
    assert_eq!(ctx.patches.len(), 16);
    // first-detected order survives the cap
    assert_eq!(ctx.patches[0].diff, "diff-00");
    assert_eq!(ctx.patches[15].diff, "diff-15");
}
