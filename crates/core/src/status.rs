// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline step outcome records.

use serde::{Deserialize, Serialize};

/// Terminal outcome kind of one executed pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Step ran its business logic to completion.
    Success,
    /// Step ran and failed, or its business logic returned an internal error.
    Failure,
    /// Step never ran (unmet precondition or failed predecessor).
    Skipped,
    /// Repair-specific non-fatal terminal: ran correctly, found nothing to fix.
    PatchNotFound,
}

impl StatusKind {
    pub fn is_success(&self) -> bool {
        matches!(self, StatusKind::Success)
    }
}

crate::simple_display! {
    StatusKind {
        Success => "success",
        Failure => "failure",
        Skipped => "skipped",
        PatchNotFound => "patch_not_found",
    }
}

/// Outcome record of one executed step.
///
/// Every executed step appends exactly one of these to the job's status
/// list, in execution order. The entry at index `i` always corresponds to
/// the i-th executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStatus {
    /// Name of the step that produced this status.
    pub step: String,
    pub kind: StatusKind,
    /// Diagnostic message for non-success outcomes.
    pub diagnostic: Option<String>,
}

impl StepStatus {
    pub fn success(step: &str) -> Self {
        Self { step: step.to_string(), kind: StatusKind::Success, diagnostic: None }
    }

    pub fn failure(step: &str, diagnostic: impl Into<String>) -> Self {
        Self {
            step: step.to_string(),
            kind: StatusKind::Failure,
            diagnostic: Some(diagnostic.into()),
        }
    }

    pub fn skipped(step: &str, diagnostic: impl Into<String>) -> Self {
        Self {
            step: step.to_string(),
            kind: StatusKind::Skipped,
            diagnostic: Some(diagnostic.into()),
        }
    }

    pub fn patch_not_found(step: &str) -> Self {
        Self { step: step.to_string(), kind: StatusKind::PatchNotFound, diagnostic: None }
    }

    pub fn is_success(&self) -> bool {
        self.kind.is_success()
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
