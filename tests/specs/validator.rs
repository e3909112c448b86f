// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restoration-law specs for the patch tester.

use crate::prelude::*;
use mend_core::RepairPatch;

fn rig() -> (TempRepo, PatchTester, FakeBuild) {
    let repo = TempRepo::new();
    repo.write("App.java", APP_JAVA);
    repo.commit_all("seed app");
    let build = FakeBuild::new();
    let tester = PatchTester::new(GitWorkTree::open(repo.path()), Arc::new(build.clone()));
    (repo, tester, build)
}

#[tokio::test]
async fn repository_is_restored_no_matter_how_validation_ends() {
    let (repo, tester, build) = rig();
    let good = RepairPatch::new("sequencer", repo.path().join("App.java"), repo.diff_for("App.java", APP_JAVA_FIXED));
    let bad = RepairPatch::new(
        "sequencer",
        repo.path().join("App.java"),
        "--- a/App.java\n+++ b/App.java\n@@ -1 +1 @@\n-nope\n+still nope\n",
    );

    build.push_success();
    assert!(tester.apply(&good, "test", &BTreeMap::new()).await);

    build.push_failure("BUILD FAILURE");
    assert!(!tester.apply(&good, "test", &BTreeMap::new()).await);

    assert!(!tester.apply(&bad, "test", &BTreeMap::new()).await);

    build.push_error();
    assert!(!tester.apply(&good, "test", &BTreeMap::new()).await);

    assert_eq!(repo.current_branch(), "main");
    assert_eq!(repo.branches(), vec!["main".to_string()]);
    let content = std::fs::read_to_string(repo.path().join("App.java")).unwrap();
    assert_eq!(content, APP_JAVA);
}

#[tokio::test]
async fn identical_patches_get_identical_verdicts() {
    let (repo, tester, _build) = rig();
    let patch = RepairPatch::new(
        "sequencer",
        repo.path().join("App.java"),
        repo.diff_for("App.java", APP_JAVA_FIXED),
    );

    let first = tester.apply(&patch, "test", &BTreeMap::new()).await;
    let second = tester.apply(&patch, "test", &BTreeMap::new()).await;
    assert_eq!(first, second);
    assert!(first);
}
