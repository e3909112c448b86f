// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git working-tree operations over the git CLI.
//!
//! One [`GitWorkTree`] owns one checkout. Branch and checkout state is
//! global to a repository, so callers that interleave operations (the
//! patch tester in particular) must hold their own mutual exclusion; the
//! handle itself does not lock.

use crate::subprocess::{run_with_timeout, SubprocessError, GIT_CLONE_TIMEOUT, GIT_COMMAND_TIMEOUT};
use std::path::{Path, PathBuf};
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum GitError {
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
    #[error("git {op} failed: {stderr}")]
    Command { op: String, stderr: String },
}

/// Handle on one local git checkout.
#[derive(Debug, Clone)]
pub struct GitWorkTree {
    root: PathBuf,
}

impl GitWorkTree {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Clone `url` into `dest` and return a handle on the new checkout.
    pub async fn clone_into(url: &str, dest: &Path) -> Result<Self, GitError> {
        let mut cmd = Command::new("git");
        cmd.args(["clone", url])
            .arg(dest)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE");
        let output = run_with_timeout(cmd, GIT_CLONE_TIMEOUT, "git clone").await?;
        check(output, "clone")?;
        Ok(Self::open(dest))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the currently checked-out branch.
    pub async fn current_branch(&self) -> Result<String, GitError> {
        let output = self.git(&["rev-parse", "--abbrev-ref", "HEAD"], "rev-parse").await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub async fn checkout_commit(&self, rev: &str) -> Result<(), GitError> {
        self.git(&["checkout", rev], "checkout").await?;
        Ok(())
    }

    pub async fn create_branch(&self, name: &str, start_point: &str) -> Result<(), GitError> {
        self.git(&["branch", name, start_point], "branch").await?;
        Ok(())
    }

    pub async fn checkout(&self, name: &str) -> Result<(), GitError> {
        self.git(&["checkout", name], "checkout").await?;
        Ok(())
    }

    /// Apply a unified diff, tolerating whitespace drift.
    ///
    /// A diff that does not apply is an ordinary outcome, reported as
    /// `Ok(false)`; `Err` means git itself could not run.
    pub async fn apply_patch(&self, diff_file: &Path) -> Result<bool, GitError> {
        let diff = diff_file.display().to_string();
        let output = self
            .run_git(&["apply", "--ignore-whitespace", &diff], "apply")
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(stderr = %stderr.trim(), "patch did not apply");
        }
        Ok(output.status.success())
    }

    pub async fn reset_hard(&self) -> Result<(), GitError> {
        self.git(&["reset", "--hard"], "reset").await?;
        Ok(())
    }

    pub async fn delete_branch(&self, name: &str) -> Result<(), GitError> {
        self.git(&["branch", "-D", name], "branch -D").await?;
        Ok(())
    }

    /// List local branch names, used to verify cleanup in tests and to
    /// sweep leftovers.
    pub async fn local_branches(&self) -> Result<Vec<String>, GitError> {
        let output = self
            .git(&["for-each-ref", "--format=%(refname:short)", "refs/heads"], "for-each-ref")
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }

    async fn git(&self, args: &[&str], op: &str) -> Result<Output, GitError> {
        let output = self.run_git(args, op).await?;
        check(output, op)
    }

    async fn run_git(&self, args: &[&str], op: &str) -> Result<Output, GitError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.root)
            .args(args)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE");
        Ok(run_with_timeout(cmd, GIT_COMMAND_TIMEOUT, &format!("git {}", op)).await?)
    }
}

fn check(output: Output, op: &str) -> Result<Output, GitError> {
    if output.status.success() {
        Ok(output)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(GitError::Command { op: op.to_string(), stderr })
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
