// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mend-adapters: capabilities over the outside world.
//!
//! Everything the engine needs from beyond its own process lives behind
//! a trait here: the container runtime, the git working tree, the build
//! tool, and the overfitting classifier. Fake implementations for tests
//! are exported behind the `test-support` feature.

pub mod build;
pub mod classifier;
pub mod container;
pub mod git;
pub mod mounts;
pub mod subprocess;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use build::{BuildError, BuildOutcome, BuildRunner, MavenCli};
pub use classifier::{ClassifierError, CommandClassifier, PatchClassifier};
pub use container::{
    BindMount, ContainerError, ContainerId, ContainerLogs, ContainerRuntime, ContainerSpec,
    DockerCli, MountPoint,
};
pub use git::{GitError, GitWorkTree};
pub use mounts::MountMap;
pub use subprocess::{run, run_with_timeout, SubprocessError};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeBuild, FakeClassifier, FakeRuntime, FakeToolRun};
