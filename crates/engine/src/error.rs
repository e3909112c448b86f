// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-internal errors.
//!
//! These never cross a step boundary: the chain converts them into
//! FAILURE statuses, and the repair step absorbs per-candidate instances
//! entirely.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("container runtime error: {0}")]
    Container(#[from] mend_adapters::ContainerError),
    #[error("git error: {0}")]
    Git(#[from] mend_adapters::GitError),
    #[error("build error: {0}")]
    Build(#[from] mend_adapters::BuildError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}
