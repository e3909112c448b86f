// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers: scripted detection strategies and throwaway git repos.

// test-only helpers may panic on broken preconditions
#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use crate::detection::DetectionStrategy;
use async_trait::async_trait;
use mend_core::{JobContext, ModificationPoint, RepairPatch};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

#[derive(Default)]
struct DetectorCalls {
    setup: usize,
    detect: usize,
    validate: usize,
}

/// Shared view on a [`ScriptedDetector`]'s call counters, usable after
/// the detector has been boxed into a repair step.
#[derive(Clone, Default)]
pub struct DetectorProbe {
    calls: Arc<Mutex<DetectorCalls>>,
}

impl DetectorProbe {
    pub fn setup_calls(&self) -> usize {
        self.calls.lock().setup
    }

    pub fn detect_calls(&self) -> usize {
        self.calls.lock().detect
    }

    pub fn validate_calls(&self) -> usize {
        self.calls.lock().validate
    }
}

/// Detection strategy returning scripted points and rejecting scripted
/// diffs, with no tester behind it.
pub struct ScriptedDetector {
    points: Vec<ModificationPoint>,
    reject: HashSet<String>,
    probe: DetectorProbe,
}

impl ScriptedDetector {
    pub fn new(points: Vec<ModificationPoint>) -> Self {
        Self { points, reject: HashSet::new(), probe: DetectorProbe::default() }
    }

    /// Reject any candidate with exactly this diff text.
    pub fn rejecting(mut self, diff: &str) -> Self {
        self.reject.insert(diff.to_string());
        self
    }

    pub fn probe(&self) -> DetectorProbe {
        self.probe.clone()
    }
}

#[async_trait]
impl DetectionStrategy for ScriptedDetector {
    fn setup(&mut self, _repo: &Path, _build_file: &Path) {
        self.probe.calls.lock().setup += 1;
    }

    async fn detect(&mut self, _ctx: &JobContext) -> Vec<ModificationPoint> {
        self.probe.calls.lock().detect += 1;
        self.points.clone()
    }

    async fn validate(&self, patch: &RepairPatch) -> bool {
        self.probe.calls.lock().validate += 1;
        !self.reject.contains(&patch.diff)
    }
}

/// Temporary git repository with one seed commit on `main`.
pub struct TempRepo {
    dir: tempfile::TempDir,
}

impl TempRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = Self { dir };
        repo.git(&["init", "-b", "main", "."]);
        repo.git(&["config", "user.email", "ci@example.com"]);
        repo.git(&["config", "user.name", "ci"]);
        repo.write("README.md", "seed\n");
        repo.commit_all("seed");
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file (creating parents) without committing it.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "."]);
        self.git(&["commit", "-m", message]);
    }

    /// Produce a diff that rewrites `rel` to `new_content`, generated by
    /// git itself so `git apply` is guaranteed to accept it. The working
    /// tree is left unchanged.
    pub fn diff_for(&self, rel: &str, new_content: &str) -> String {
        self.write(rel, new_content);
        let diff = self.git(&["diff"]);
        self.git(&["checkout", "--", rel]);
        diff
    }

    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"]).trim().to_string()
    }

    pub fn branches(&self) -> Vec<String> {
        self.git(&["for-each-ref", "--format=%(refname:short)", "refs/heads"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn head_commit(&self) -> String {
        self.git(&["rev-parse", "HEAD"]).trim().to_string()
    }

    /// Run git in the repo, panicking on failure.
    pub fn git(&self, args: &[&str]) -> String {
        let output = std::process::Command::new("git")
            .arg("-C")
            .arg(self.dir.path())
            .args(args)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .output()
            .expect("spawn git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

impl Default for TempRepo {
    fn default() -> Self {
        Self::new()
    }
}
