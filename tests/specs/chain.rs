// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full pipeline specs: preparatory steps feeding the repair step.

use crate::prelude::*;

/// Origin repository with a conventional Maven layout.
fn origin() -> TempRepo {
    let repo = TempRepo::new();
    repo.write("pom.xml", "<project/>\n");
    repo.write("src/main/java/com/example/App.java", APP_JAVA);
    repo.commit_all("failing project");
    repo
}

#[tokio::test]
async fn pipeline_with_zero_detected_points_ends_in_patch_not_found() {
    let origin = origin();
    let commit = origin.head_commit();
    let workspace = tempfile::tempdir().unwrap();
    let mut ctx = JobContext::new(workspace.path().join("repo"), workspace.path());

    let build = FakeBuild::new();
    build.push_success(); // test-compile
    build.push_failure(SUREFIRE_FAILURE_LOG); // test run: must fail
    build.push_success_writing(
        workspace.path().join("repo/.mend-classpath.txt"),
        "/m2/junit.jar:/m2/hamcrest.jar",
    );
    let runner = Arc::new(build.clone());

    let repair = ToolRepairStep::new(
        spec_config(),
        Arc::new(FakeRuntime::new().with_image_present()),
        MountMap::identity(),
        Box::new(ScriptedDetector::new(Vec::new())),
        Arc::new(FakeClassifier::new()),
    );

    StepChain::starting_with(CloneRepository::new(origin.path().display().to_string()))
        .add_next_step(CheckoutCommit::new(commit.clone()))
        .add_next_step(BuildProject::new(runner.clone()))
        .add_next_step(GatherTestInfo::new(runner.clone()))
        .add_next_step(ComputeClasspath::new(runner.clone()))
        .add_next_step(ComputeSourceDir::new())
        .add_next_step(repair)
        .execute(&mut ctx)
        .await;

    assert_eq!(ctx.step_statuses.len(), 7);
    for status in &ctx.step_statuses[..6] {
        assert!(status.is_success(), "step {} was {:?}", status.step, status.kind);
    }
    assert_eq!(ctx.step_statuses[6].step, "repair");
    assert_eq!(ctx.step_statuses[6].kind, StatusKind::PatchNotFound);

    // the preparatory steps actually filled the context
    assert_eq!(ctx.commit.as_deref(), Some(commit.as_str()));
    assert_eq!(ctx.failing_tests, ["com.example.AppTest#testAdd"]);
    assert_eq!(ctx.repair_classpath.len(), 2);
    assert_eq!(ctx.repair_source_dirs.len(), 1);
    assert!(ctx.patches.is_empty());
    assert!(!ctx.has_been_patched);
}

#[tokio::test]
async fn clone_failure_skips_every_following_step() {
    let workspace = tempfile::tempdir().unwrap();
    let mut ctx = JobContext::new(workspace.path().join("repo"), workspace.path());
    let runner = Arc::new(FakeBuild::new());

    StepChain::starting_with(CloneRepository::new("/definitely/not/a/repository"))
        .add_next_step(CheckoutCommit::new("deadbeef"))
        .add_next_step(BuildProject::new(runner))
        .execute(&mut ctx)
        .await;

    assert_eq!(ctx.step_statuses.len(), 3);
    assert_eq!(ctx.step_statuses[0].kind, StatusKind::Failure);
    assert_eq!(ctx.step_statuses[1].kind, StatusKind::Skipped);
    assert_eq!(ctx.step_statuses[2].kind, StatusKind::Skipped);
}

#[tokio::test]
async fn passing_test_run_fails_the_gather_step() {
    let origin = origin();
    let workspace = tempfile::tempdir().unwrap();
    let mut ctx = JobContext::new(workspace.path().join("repo"), workspace.path());

    let build = FakeBuild::new();
    build.push_success(); // test-compile
    build.push_success(); // test run passes: nothing to repair
    let runner = Arc::new(build);

    StepChain::starting_with(CloneRepository::new(origin.path().display().to_string()))
        .add_next_step(BuildProject::new(runner.clone()))
        .add_next_step(GatherTestInfo::new(runner.clone()))
        .add_next_step(ComputeClasspath::new(runner))
        .execute(&mut ctx)
        .await;

    let kinds: Vec<_> = ctx.step_statuses.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        [StatusKind::Success, StatusKind::Success, StatusKind::Failure, StatusKind::Skipped]
    );
}

#[tokio::test]
async fn repair_without_computed_inputs_reports_skipped() {
    let origin = origin();
    let mut ctx = JobContext::new(origin.path(), origin.path());

    let repair = ToolRepairStep::new(
        spec_config(),
        Arc::new(FakeRuntime::new().with_image_present()),
        MountMap::identity(),
        Box::new(ScriptedDetector::new(Vec::new())),
        Arc::new(FakeClassifier::new()),
    );

    StepChain::starting_with(repair).execute(&mut ctx).await;

    assert_eq!(ctx.step_statuses.len(), 1);
    assert_eq!(ctx.step_statuses[0].kind, StatusKind::Skipped);
    assert!(ctx.step_statuses[0].diagnostic.as_deref().unwrap_or_default().contains("not computed"));
}
