// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Candidate detection strategies.
//!
//! A detection strategy produces the ordered set of suspicious
//! modification points fed to the repair tool, and later vets the diffs
//! the tool emits: a structural check that a diff only touches files the
//! strategy flagged, then a build-and-test check through the
//! [`PatchTester`]. Underlying tool failures surface as an empty point
//! list, never as an error, so the repair step's control flow stays
//! uniform.

use crate::validator::PatchTester;
use async_trait::async_trait;
use mend_core::{DetectorKind, JobContext, ModificationPoint, RepairPatch};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File a prior fault-localization run leaves at the repository root.
pub const FAULT_REPORT_FILE: &str = "mend.fault-report.json";

#[async_trait]
pub trait DetectionStrategy: Send + Sync {
    /// Configure against a specific checked-out, already-built project.
    fn setup(&mut self, repo: &Path, build_file: &Path);

    /// Ordered suspicious locations; empty when none were found or the
    /// underlying tool failed.
    async fn detect(&mut self, ctx: &JobContext) -> Vec<ModificationPoint>;

    /// Whether a candidate diff is acceptable: structurally confined to
    /// the tracked suspicious set, and buildable with tests passing.
    async fn validate(&self, patch: &RepairPatch) -> bool;
}

/// Build the detection backend selected by configuration.
pub fn detector_for(
    kind: DetectorKind,
    tester: Arc<PatchTester>,
    goal: &str,
    properties: BTreeMap<String, String>,
    context_size: u32,
) -> Box<dyn DetectionStrategy> {
    match kind {
        DetectorKind::FaultReport => {
            Box::new(FaultReportDetector::new(tester, goal, properties, context_size))
        }
        DetectorKind::StackTrace => {
            Box::new(StackTraceDetector::new(tester, goal, properties, context_size))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReportEntry {
    file: String,
    line: u32,
    #[serde(default)]
    suspiciousness: f64,
}

/// Derives modification points from a prior fault-localization tool's
/// report file, ordered by suspiciousness.
pub struct FaultReportDetector {
    repo: PathBuf,
    tester: Arc<PatchTester>,
    goal: String,
    properties: BTreeMap<String, String>,
    context_size: u32,
    tracked: HashSet<PathBuf>,
}

impl FaultReportDetector {
    pub fn new(
        tester: Arc<PatchTester>,
        goal: &str,
        properties: BTreeMap<String, String>,
        context_size: u32,
    ) -> Self {
        Self {
            repo: PathBuf::new(),
            tester,
            goal: goal.to_string(),
            properties,
            context_size,
            tracked: HashSet::new(),
        }
    }
}

#[async_trait]
impl DetectionStrategy for FaultReportDetector {
    fn setup(&mut self, repo: &Path, _build_file: &Path) {
        self.repo = repo.to_path_buf();
    }

    async fn detect(&mut self, _ctx: &JobContext) -> Vec<ModificationPoint> {
        let report_path = self.repo.join(FAULT_REPORT_FILE);
        let raw = match tokio::fs::read_to_string(&report_path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(report = %report_path.display(), error = %e, "no fault report to read");
                return Vec::new();
            }
        };
        let mut entries: Vec<ReportEntry> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(report = %report_path.display(), error = %e, "malformed fault report");
                return Vec::new();
            }
        };
        entries.sort_by(|a, b| {
            b.suspiciousness
                .partial_cmp(&a.suspiciousness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut points = Vec::new();
        for entry in entries {
            let file = self.repo.join(&entry.file);
            let content = match tokio::fs::read_to_string(&file).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "suspicious file unreadable");
                    continue;
                }
            };
            let context = context_lines(&content, entry.line, self.context_size);
            self.tracked.insert(file.clone());
            points.push(
                ModificationPoint::new(file, entry.line, context)
                    .with_suspiciousness(entry.suspiciousness),
            );
        }
        points
    }

    async fn validate(&self, patch: &RepairPatch) -> bool {
        if !touches_only_tracked(&self.tracked, &patch.diff) {
            tracing::debug!(file = %patch.file_path.display(), "diff touches files outside the suspicious set");
            return false;
        }
        self.tester.apply(patch, &self.goal, &self.properties).await
    }
}

/// Derives modification points from failing-test stack traces gathered
/// by the test-info step, restricted to files under the computed source
/// roots.
pub struct StackTraceDetector {
    tester: Arc<PatchTester>,
    goal: String,
    properties: BTreeMap<String, String>,
    context_size: u32,
    tracked: HashSet<PathBuf>,
}

impl StackTraceDetector {
    pub fn new(
        tester: Arc<PatchTester>,
        goal: &str,
        properties: BTreeMap<String, String>,
        context_size: u32,
    ) -> Self {
        Self {
            tester,
            goal: goal.to_string(),
            properties,
            context_size,
            tracked: HashSet::new(),
        }
    }
}

#[async_trait]
impl DetectionStrategy for StackTraceDetector {
    fn setup(&mut self, _repo: &Path, _build_file: &Path) {}

    async fn detect(&mut self, ctx: &JobContext) -> Vec<ModificationPoint> {
        let mut points = Vec::new();
        let mut seen = HashSet::new();
        for (file_name, line) in parse_trace_frames(&ctx.failure_log) {
            let Some(file) = find_source_file(&ctx.repair_source_dirs, &file_name) else {
                continue;
            };
            if !seen.insert((file.clone(), line)) {
                continue;
            }
            let content = match tokio::fs::read_to_string(&file).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "suspicious file unreadable");
                    continue;
                }
            };
            let context = context_lines(&content, line, self.context_size);
            self.tracked.insert(file.clone());
            points.push(ModificationPoint::new(file, line, context));
        }
        points
    }

    async fn validate(&self, patch: &RepairPatch) -> bool {
        if !touches_only_tracked(&self.tracked, &patch.diff) {
            tracing::debug!(file = %patch.file_path.display(), "diff touches files outside the suspicious set");
            return false;
        }
        self.tester.apply(patch, &self.goal, &self.properties).await
    }
}

/// Source lines around a 1-based line number, `context` on each side.
pub(crate) fn context_lines(content: &str, line: u32, context: u32) -> Vec<String> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() || line == 0 {
        return Vec::new();
    }
    let center = (line as usize - 1).min(lines.len() - 1);
    let start = center.saturating_sub(context as usize);
    let end = (center + context as usize + 1).min(lines.len());
    lines[start..end].iter().map(|l| l.to_string()).collect()
}

/// `(file name, line)` pairs from `(File.java:123)` stack-frame suffixes.
pub(crate) fn parse_trace_frames(log: &str) -> Vec<(String, u32)> {
    let mut frames = Vec::new();
    for segment in log.split('(').skip(1) {
        let Some(inner) = segment.split(')').next() else {
            continue;
        };
        let Some((file, line)) = inner.rsplit_once(':') else {
            continue;
        };
        if !file.ends_with(".java") || file.contains('/') {
            continue;
        }
        if let Ok(line) = line.parse::<u32>() {
            frames.push((file.to_string(), line));
        }
    }
    frames
}

/// Repository-relative paths a unified diff modifies.
pub(crate) fn diff_target_files(diff: &str) -> Vec<String> {
    let mut targets = Vec::new();
    for line in diff.lines() {
        let Some(rest) = line.strip_prefix("+++ ") else {
            continue;
        };
        let path = rest.split_whitespace().next().unwrap_or_default();
        let path = path.strip_prefix("b/").unwrap_or(path);
        if !path.is_empty() && path != "/dev/null" {
            targets.push(path.to_string());
        }
    }
    targets
}

/// Whether every file a diff modifies is in the tracked suspicious set.
fn touches_only_tracked(tracked: &HashSet<PathBuf>, diff: &str) -> bool {
    let targets = diff_target_files(diff);
    if targets.is_empty() {
        return false;
    }
    targets
        .iter()
        .all(|target| tracked.iter().any(|file| file.ends_with(target)))
}

/// Search the source roots for a file with the given name.
fn find_source_file(source_dirs: &[PathBuf], file_name: &str) -> Option<PathBuf> {
    fn walk(dir: &Path, file_name: &str) -> Option<PathBuf> {
        let entries = std::fs::read_dir(dir).ok()?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if let Some(found) = walk(&path, file_name) {
                    return Some(found);
                }
            } else if path.file_name().is_some_and(|n| n == file_name) {
                return Some(path);
            }
        }
        None
    }
    source_dirs.iter().find_map(|dir| walk(dir, file_name))
}

#[cfg(test)]
#[path = "detection_tests.rs"]
mod tests;
