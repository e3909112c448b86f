// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::process::Command as StdCommand;

fn sh(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new(args[0])
        .args(&args[1..])
        .current_dir(dir)
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Fresh repository with one committed file on branch `main`.
fn init_repo(dir: &Path) {
    sh(dir, &["git", "init", "-b", "main", "."]);
    sh(dir, &["git", "config", "user.email", "ci@example.com"]);
    sh(dir, &["git", "config", "user.name", "ci"]);
    std::fs::write(dir.join("App.java"), "class App {\n    int x = 1;\n}\n").unwrap();
    sh(dir, &["git", "add", "."]);
    sh(dir, &["git", "commit", "-m", "seed"]);
}

/// A diff produced by git itself, so `git apply` is guaranteed to take it.
fn diff_changing_x(dir: &Path) -> String {
    std::fs::write(dir.join("App.java"), "class App {\n    int x = 2;\n}\n").unwrap();
    let diff = sh(dir, &["git", "diff"]);
    sh(dir, &["git", "checkout", "--", "App.java"]);
    diff
}

#[tokio::test]
async fn current_branch_reports_main() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let git = GitWorkTree::open(dir.path());
    assert_eq!(git.current_branch().await.unwrap(), "main");
}

#[tokio::test]
async fn clone_into_copies_a_local_repo() {
    let origin = tempfile::tempdir().unwrap();
    init_repo(origin.path());
    let dest = tempfile::tempdir().unwrap();
    let clone_path = dest.path().join("repo");

    let git = GitWorkTree::clone_into(&origin.path().display().to_string(), &clone_path)
        .await
        .unwrap();
    assert!(clone_path.join("App.java").exists());
    assert_eq!(git.current_branch().await.unwrap(), "main");
}

#[tokio::test]
async fn branch_create_checkout_delete_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let git = GitWorkTree::open(dir.path());

    git.create_branch("candidate-1", "main").await.unwrap();
    git.checkout("candidate-1").await.unwrap();
    assert_eq!(git.current_branch().await.unwrap(), "candidate-1");

    git.checkout("main").await.unwrap();
    git.delete_branch("candidate-1").await.unwrap();
    assert_eq!(git.local_branches().await.unwrap(), vec!["main".to_string()]);
}

#[tokio::test]
async fn apply_patch_takes_a_valid_diff() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let diff = diff_changing_x(dir.path());
    let diff_file = dir.path().join("candidate.diff");
    std::fs::write(&diff_file, diff).unwrap();

    let git = GitWorkTree::open(dir.path());
    assert!(git.apply_patch(&diff_file).await.unwrap());
    let content = std::fs::read_to_string(dir.path().join("App.java")).unwrap();
    assert!(content.contains("int x = 2;"));
}

#[tokio::test]
async fn apply_patch_reports_false_on_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let diff_file = dir.path().join("candidate.diff");
    std::fs::write(
        &diff_file,
        "--- a/App.java\n+++ b/App.java\n@@ -1,3 +1,3 @@\n class App {\n-    int y = 9;\n+    int y = 10;\n }\n",
    )
    .unwrap();

    let git = GitWorkTree::open(dir.path());
    assert!(!git.apply_patch(&diff_file).await.unwrap());
}

#[tokio::test]
async fn reset_hard_restores_tracked_files() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    std::fs::write(dir.path().join("App.java"), "garbage").unwrap();

    let git = GitWorkTree::open(dir.path());
    git.reset_hard().await.unwrap();
    let content = std::fs::read_to_string(dir.path().join("App.java")).unwrap();
    assert!(content.contains("int x = 1;"));
}

#[tokio::test]
async fn command_failure_carries_stderr() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let git = GitWorkTree::open(dir.path());
    let err = git.checkout("no-such-branch").await.unwrap_err();
    match err {
        GitError::Command { op, stderr } => {
            assert_eq!(op, "checkout");
            assert!(!stderr.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}
