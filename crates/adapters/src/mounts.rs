// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sibling-container mount-path resolution.
//!
//! A process running inside a container cannot bind-mount one of its own
//! paths into a sibling container: the runtime daemon resolves bind
//! sources against the *host* filesystem. [`MountMap`] translates a
//! container-relative path into the host path the runtime already
//! exposes, by consulting this process's own container mount table.
//! Outside a container the map is empty and resolution is the identity.

use crate::container::{ContainerError, ContainerId, ContainerRuntime, MountPoint};
use std::path::{Path, PathBuf};

/// Marker file present in every Docker container filesystem.
const CONTAINER_MARKER: &str = "/.dockerenv";
/// cgroup path whose basename is this container's id.
const SELF_CPUSET: &str = "/proc/1/cpuset";

/// Destination-to-source mapping of this process's container mounts.
#[derive(Debug, Clone, Default)]
pub struct MountMap {
    /// Sorted so longer destinations match first.
    entries: Vec<MountPoint>,
}

impl MountMap {
    /// Identity mapping, used when not running inside a container.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_mounts(mut mounts: Vec<MountPoint>) -> Self {
        mounts.sort_by(|a, b| {
            b.destination
                .as_os_str()
                .len()
                .cmp(&a.destination.as_os_str().len())
        });
        Self { entries: mounts }
    }

    pub fn is_identity(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translate a container-relative path into its host path.
    ///
    /// The longest mount destination that prefixes `path` wins; a path
    /// under no mount (or an identity map) is returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        for mount in &self.entries {
            if let Ok(rest) = path.strip_prefix(&mount.destination) {
                return mount.source.join(rest);
            }
        }
        path.to_path_buf()
    }

    /// Detect whether this process runs inside a container and, if so,
    /// build the map from its own mount table.
    ///
    /// Detection failures degrade to the identity map with a warning:
    /// mounts then pass through unchanged, which is correct outside a
    /// container and loudly wrong inside one.
    pub async fn detect(runtime: &dyn ContainerRuntime) -> Self {
        if !Path::new(CONTAINER_MARKER).exists() {
            return Self::identity();
        }
        match Self::inspect_self(runtime).await {
            Ok(map) => {
                tracing::info!(mounts = map.entries.len(), "resolved own container mount table");
                map
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not inspect own container; using identity mounts");
                Self::identity()
            }
        }
    }

    async fn inspect_self(runtime: &dyn ContainerRuntime) -> Result<Self, ContainerError> {
        let cpuset = tokio::fs::read_to_string(SELF_CPUSET).await.map_err(|e| {
            ContainerError::Malformed { op: "inspect", detail: format!("{}: {}", SELF_CPUSET, e) }
        })?;
        let container_id = cpuset
            .trim()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if container_id.is_empty() {
            return Err(ContainerError::Malformed {
                op: "inspect",
                detail: "empty container id in cpuset".to_string(),
            });
        }
        let mounts = runtime.mounts(&ContainerId::new(container_id)).await?;
        Ok(Self::from_mounts(mounts))
    }
}

#[cfg(test)]
#[path = "mounts_tests.rs"]
mod tests;
