// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repair engine configuration.
//!
//! Values are read from environment variables once at startup so the
//! launcher's command line stays small; every component receives an
//! explicit, immutable [`RepairConfig`] value at construction. Absent,
//! empty, or unparsable variables fall back to defaults rather than
//! erroring.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where raw patched-file contents are fetched from when exporting
/// training data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchSource {
    #[default]
    RawGithub,
}

/// Which detection backend produces modification points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Suspicious lines from a prior fault-localization tool's report.
    #[default]
    FaultReport,
    /// Suspicious lines from failing-test stack traces.
    StackTrace,
}

crate::simple_display! {
    DetectorKind {
        FaultReport => "fault_report",
        StackTrace => "stack_trace",
    }
}

/// Immutable configuration for one repair run.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairConfig {
    /// Container image tag of the repair tool.
    pub docker_tag: String,
    /// Bound on concurrently running sandboxed workers.
    pub threads: usize,
    /// Beam width handed to the generative repair tool.
    pub beam_size: u32,
    /// Wall-clock budget for one whole worker batch.
    pub timeout: Duration,
    /// Where continuous-learning data is collected.
    pub collector_path: PathBuf,
    /// Source lines of context captured around a suspicious line.
    pub context_size: u32,
    pub patch_source: PatchSource,
    pub detector: DetectorKind,
    /// External overfitting-oracle executable; `None` disables
    /// classification (every patch stays unlabelled).
    pub classifier_command: Option<PathBuf>,
    /// At most this many patches are recorded per tool.
    pub max_patches_per_tool: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            docker_tag: "mend/sequencer-multimodel:1.0".to_string(),
            threads: 4,
            beam_size: 50,
            timeout: Duration::from_secs(120 * 60),
            collector_path: default_collector_path(),
            context_size: 3,
            patch_source: PatchSource::default(),
            detector: DetectorKind::default(),
            classifier_command: None,
            max_patches_per_tool: 16,
        }
    }
}

impl RepairConfig {
    /// Read configuration from `MEND_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            docker_tag: env_or("MEND_DOCKER_TAG", defaults.docker_tag),
            threads: env_parsed("MEND_THREADS", defaults.threads),
            beam_size: env_parsed("MEND_BEAM_SIZE", defaults.beam_size),
            timeout: Duration::from_secs(env_parsed("MEND_TIMEOUT_MINUTES", 120u64) * 60),
            collector_path: PathBuf::from(env_or(
                "MEND_COLLECTOR_PATH",
                defaults.collector_path.to_string_lossy().into_owned(),
            )),
            context_size: env_parsed("MEND_CONTEXT_SIZE", defaults.context_size),
            patch_source: parse_patch_source(env_or("MEND_PATCH_SOURCE", String::new())),
            detector: parse_detector(env_or("MEND_DETECTOR", String::new())),
            classifier_command: match env_or("MEND_CLASSIFIER_PATH", String::new()) {
                s if s.is_empty() => None,
                s => Some(PathBuf::from(s)),
            },
            max_patches_per_tool: env_parsed(
                "MEND_MAX_PATCHES_PER_TOOL",
                defaults.max_patches_per_tool,
            ),
        }
    }
}

fn default_collector_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/var/lib/mend"))
        .join("continuous-learning-data")
}

fn env_or(name: &str, default: String) -> String {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => default,
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => value.parse().unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_patch_source(_value: String) -> PatchSource {
    // single variant today; switch on the value when another source lands
    PatchSource::RawGithub
}

fn parse_detector(value: String) -> DetectorKind {
    match value.as_str() {
        "stack_trace" => DetectorKind::StackTrace,
        _ => DetectorKind::FaultReport,
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
