// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Suspicious code locations fed to repair tools.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Hex characters kept from the identity digest.
const IDENTITY_LEN: usize = 12;

/// A specific file/line identified as a plausible root cause for a
/// failing test.
///
/// Produced by a detection strategy, consumed read-only by sandboxed
/// workers. Two points may name the same file at different lines; their
/// [`identity`](Self::identity) hashes still differ, so concurrent
/// workers never share an output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationPoint {
    /// Absolute path of the suspicious file.
    pub file_path: PathBuf,
    /// 1-based suspicious line number.
    pub line: u32,
    /// Source lines surrounding the suspicious line.
    pub context: Vec<String>,
    /// Suspiciousness score reported by the localizer, higher is worse.
    pub suspiciousness: f64,
}

impl ModificationPoint {
    pub fn new(file_path: impl Into<PathBuf>, line: u32, context: Vec<String>) -> Self {
        Self { file_path: file_path.into(), line, context, suspiciousness: 0.0 }
    }

    pub fn with_suspiciousness(mut self, score: f64) -> Self {
        self.suspiciousness = score;
        self
    }

    /// Stable identity hash, used to namespace per-candidate output
    /// directories.
    pub fn identity(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.file_path.to_string_lossy().as_bytes());
        hasher.update(self.line.to_le_bytes());
        for line in &self.context {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        let digest = hasher.finalize();
        let mut hash = hex::encode(digest);
        hash.truncate(IDENTITY_LEN);
        hash
    }
}

#[cfg(test)]
#[path = "point_tests.rs"]
mod tests;
