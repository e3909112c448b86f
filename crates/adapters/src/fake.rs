// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake adapters for tests.
//!
//! `FakeRuntime` scripts containerized tool runs per modification point
//! (matched by a substring of the container command), `FakeBuild` scripts
//! build verdicts in invocation order, and `FakeClassifier` scripts
//! labels. All record their calls for assertions.

use crate::build::{BuildError, BuildOutcome, BuildRunner};
use crate::classifier::{ClassifierError, PatchClassifier};
use crate::container::{
    ContainerError, ContainerId, ContainerLogs, ContainerRuntime, ContainerSpec, MountPoint,
};
use crate::subprocess::SubprocessError;
use async_trait::async_trait;
use mend_core::{PatchLabel, RepairPatch};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Scripted behavior of one fake container run.
#[derive(Debug, Clone)]
pub enum FakeToolRun {
    /// `wait` drops these diffs into the `/out` bind and exits 0.
    Diffs(Vec<String>),
    /// `wait` returns this exit code; `logs` carries the stderr.
    Exit { code: i64, stderr: String },
    /// `start` fails with this message.
    FailStart(String),
    /// `wait` blocks this long, then exits 0 with no diffs.
    Hang(Duration),
}

#[derive(Default)]
struct RuntimeState {
    image_present: bool,
    pull_error: Option<String>,
    pulls: u32,
    scripts: Vec<(String, FakeToolRun)>,
    specs: HashMap<String, ContainerSpec>,
    assigned: HashMap<String, FakeToolRun>,
    logs: HashMap<String, ContainerLogs>,
    self_mounts: Vec<MountPoint>,
    created: u64,
    removed: Vec<String>,
}

/// In-memory container runtime with scriptable per-run behavior.
#[derive(Clone, Default)]
pub struct FakeRuntime {
    state: Arc<Mutex<RuntimeState>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the tool image as already present locally.
    pub fn with_image_present(self) -> Self {
        self.state.lock().image_present = true;
        self
    }

    /// Make every pull attempt fail with `message`.
    pub fn fail_pull(self, message: &str) -> Self {
        self.state.lock().pull_error = Some(message.to_string());
        self
    }

    /// Mount table reported for any inspected container.
    pub fn with_self_mounts(self, mounts: Vec<MountPoint>) -> Self {
        self.state.lock().self_mounts = mounts;
        self
    }

    /// Script the run whose container command contains `key`.
    ///
    /// Scripts are consumed on first match; unmatched runs exit 0 with
    /// no diffs.
    pub fn script(&self, key: &str, run: FakeToolRun) {
        self.state.lock().scripts.push((key.to_string(), run));
    }

    pub fn pull_count(&self) -> u32 {
        self.state.lock().pulls
    }

    pub fn created_count(&self) -> u64 {
        self.state.lock().created
    }

    pub fn removed_ids(&self) -> Vec<String> {
        self.state.lock().removed.clone()
    }

    /// Containers created but not yet removed.
    pub fn live_containers(&self) -> u64 {
        let state = self.state.lock();
        state.created - state.removed.len() as u64
    }
}

fn out_bind(spec: &ContainerSpec) -> Option<PathBuf> {
    spec.binds
        .iter()
        .find(|b| b.target == Path::new("/out"))
        .map(|b| b.source.clone())
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn image_present(&self, _tag: &str) -> Result<bool, ContainerError> {
        Ok(self.state.lock().image_present)
    }

    async fn pull_image(&self, _tag: &str) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        if let Some(message) = &state.pull_error {
            return Err(ContainerError::Command { op: "pull", stderr: message.clone() });
        }
        state.pulls += 1;
        state.image_present = true;
        Ok(())
    }

    async fn create(&self, spec: &ContainerSpec) -> Result<ContainerId, ContainerError> {
        let mut state = self.state.lock();
        state.created += 1;
        let id = format!("fake-{}", state.created);
        let command = spec.command.join(" ");
        if let Some(index) = state.scripts.iter().position(|(key, _)| command.contains(key)) {
            let (_, run) = state.scripts.remove(index);
            state.assigned.insert(id.clone(), run);
        }
        state.specs.insert(id.clone(), spec.clone());
        Ok(ContainerId::new(id))
    }

    async fn start(&self, id: &ContainerId) -> Result<(), ContainerError> {
        let state = self.state.lock();
        if let Some(FakeToolRun::FailStart(message)) = state.assigned.get(id.as_str()) {
            return Err(ContainerError::Command { op: "start", stderr: message.clone() });
        }
        Ok(())
    }

    async fn wait(&self, id: &ContainerId) -> Result<i64, ContainerError> {
        let (run, out_dir) = {
            let state = self.state.lock();
            let run = state.assigned.get(id.as_str()).cloned();
            let out_dir = state.specs.get(id.as_str()).and_then(out_bind);
            (run, out_dir)
        };
        match run {
            Some(FakeToolRun::Diffs(diffs)) => {
                let out_dir = out_dir.ok_or_else(|| ContainerError::Malformed {
                    op: "wait",
                    detail: "no /out bind to write diffs into".to_string(),
                })?;
                for (i, diff) in diffs.iter().enumerate() {
                    std::fs::write(out_dir.join(format!("candidate{:03}.diff", i)), diff).map_err(
                        |e| ContainerError::Malformed { op: "wait", detail: e.to_string() },
                    )?;
                }
                self.state.lock().logs.insert(
                    id.as_str().to_string(),
                    ContainerLogs {
                        stdout: format!("{} candidates generated\n", diffs.len()),
                        stderr: String::new(),
                    },
                );
                Ok(0)
            }
            Some(FakeToolRun::Exit { code, stderr }) => {
                self.state
                    .lock()
                    .logs
                    .insert(id.as_str().to_string(), ContainerLogs { stdout: String::new(), stderr });
                Ok(code)
            }
            Some(FakeToolRun::Hang(duration)) => {
                tokio::time::sleep(duration).await;
                Ok(0)
            }
            Some(FakeToolRun::FailStart(_)) | None => Ok(0),
        }
    }

    async fn logs(&self, id: &ContainerId) -> Result<ContainerLogs, ContainerError> {
        Ok(self.state.lock().logs.get(id.as_str()).cloned().unwrap_or_default())
    }

    async fn remove(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.state.lock().removed.push(id.as_str().to_string());
        Ok(())
    }

    async fn mounts(&self, _id: &ContainerId) -> Result<Vec<MountPoint>, ContainerError> {
        Ok(self.state.lock().self_mounts.clone())
    }
}

/// One scripted build verdict, optionally materializing files first.
struct ScriptedBuild {
    result: Result<BuildOutcome, ()>,
    writes: Vec<(PathBuf, String)>,
}

#[derive(Default)]
struct BuildState {
    verdicts: VecDeque<ScriptedBuild>,
    calls: Vec<(String, BTreeMap<String, String>)>,
}

/// Build runner with scripted verdicts, consumed in invocation order.
///
/// An empty script yields `Success`.
#[derive(Clone, Default)]
pub struct FakeBuild {
    state: Arc<Mutex<BuildState>>,
}

impl FakeBuild {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_success(&self) {
        self.push(Ok(BuildOutcome::Success), Vec::new());
    }

    /// Success that also writes files, standing in for goal side effects
    /// like a dependency-classpath dump.
    pub fn push_success_writing(&self, path: impl Into<PathBuf>, content: &str) {
        self.push(Ok(BuildOutcome::Success), vec![(path.into(), content.to_string())]);
    }

    pub fn push_failure(&self, log: &str) {
        self.push(Ok(BuildOutcome::Failure { log: log.to_string() }), Vec::new());
    }

    /// A build-tool execution error, not a failed build.
    pub fn push_error(&self) {
        self.push(Err(()), Vec::new());
    }

    fn push(&self, result: Result<BuildOutcome, ()>, writes: Vec<(PathBuf, String)>) {
        self.state.lock().verdicts.push_back(ScriptedBuild { result, writes });
    }

    /// Goals run so far, in order.
    pub fn goals(&self) -> Vec<String> {
        self.state.lock().calls.iter().map(|(goal, _)| goal.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }
}

#[async_trait]
impl BuildRunner for FakeBuild {
    async fn run(
        &self,
        goal: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<BuildOutcome, BuildError> {
        let scripted = {
            let mut state = self.state.lock();
            state.calls.push((goal.to_string(), properties.clone()));
            state.verdicts.pop_front()
        };
        match scripted {
            None => Ok(BuildOutcome::Success),
            Some(ScriptedBuild { result, writes }) => {
                for (path, content) in writes {
                    if let Some(parent) = path.parent() {
                        let _ = std::fs::create_dir_all(parent);
                    }
                    std::fs::write(&path, content).map_err(|e| {
                        BuildError::Subprocess(SubprocessError::Spawn {
                            label: format!("fake write {}", path.display()),
                            source: e,
                        })
                    })?;
                }
                result.map_err(|()| {
                    BuildError::Subprocess(SubprocessError::TimedOut {
                        label: "fake build".to_string(),
                        timeout: Duration::ZERO,
                    })
                })
            }
        }
    }
}

#[derive(Default)]
struct ClassifierState {
    labels: VecDeque<PatchLabel>,
    fail: bool,
    calls: Vec<(usize, String)>,
}

/// Classifier with scripted labels, consumed in patch order.
///
/// Patches beyond the script get `Unknown`.
#[derive(Clone, Default)]
pub struct FakeClassifier {
    state: Arc<Mutex<ClassifierState>>,
}

impl FakeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_labels(&self, labels: &[PatchLabel]) {
        self.state.lock().labels.extend(labels.iter().copied());
    }

    pub fn fail_next(&self) {
        self.state.lock().fail = true;
    }

    /// (patch count, project id) per classify call.
    pub fn calls(&self) -> Vec<(usize, String)> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl PatchClassifier for FakeClassifier {
    async fn classify(
        &self,
        patches: Vec<RepairPatch>,
        project_id: &str,
    ) -> Result<Vec<RepairPatch>, ClassifierError> {
        let mut state = self.state.lock();
        state.calls.push((patches.len(), project_id.to_string()));
        if state.fail {
            state.fail = false;
            return Err(ClassifierError::Malformed("scripted failure".to_string()));
        }
        Ok(patches
            .into_iter()
            .map(|patch| {
                let label = state.labels.pop_front().unwrap_or(PatchLabel::Unknown);
                patch.with_label(label)
            })
            .collect())
    }
}
