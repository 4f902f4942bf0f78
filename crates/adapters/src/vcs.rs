// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version-control wrapper.
//!
//! Every team works in its own `git worktree`; the branch cleaner and the
//! `RELEASE` command drive the same repository's main/develop branches
//! through this trait. The real implementation shells every verb out to
//! the `git` binary via [`overseer_shell::run_with_timeout`].

use async_trait::async_trait;
use overseer_shell::{run_with_timeout, ShellError, GIT_COMMAND_TIMEOUT};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error(transparent)]
    Shell(#[from] ShellError),
    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },
}

#[async_trait]
pub trait VcsAdapter: Send + Sync + 'static {
    async fn current_branch(&self, repo: &Path) -> Result<String, VcsError>;
    async fn checkout(&self, repo: &Path, branch: &str) -> Result<(), VcsError>;
    async fn merge(&self, repo: &Path, branch: &str) -> Result<(), VcsError>;
    async fn ensure_branch(&self, repo: &Path, branch: &str, from: &str) -> Result<(), VcsError>;
    async fn add_worktree(&self, repo: &Path, path: &Path, branch: &str) -> Result<(), VcsError>;
    async fn remove_worktree(&self, repo: &Path, path: &Path) -> Result<(), VcsError>;
    async fn clean_worktrees(&self, repo: &Path, prefix: &str) -> Result<(), VcsError>;
    async fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, VcsError>;
    async fn fetch_prune(&self, repo: &Path) -> Result<(), VcsError>;
    async fn merged_remote_branches(&self, repo: &Path, base: &str) -> Result<Vec<String>, VcsError>;
    async fn delete_remote_branch(&self, repo: &Path, branch: &str) -> Result<(), VcsError>;
    async fn delete_local_branch(&self, repo: &Path, branch: &str) -> Result<(), VcsError>;
}

/// Real `git`-CLI-shelling implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct GitVcsAdapter;

impl GitVcsAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn git(&self, repo: &Path, args: &[&str], operation: &str) -> Result<String, VcsError> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(repo);
        let output = run_with_timeout(cmd, GIT_COMMAND_TIMEOUT, operation).await?;
        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                operation: operation.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VcsAdapter for GitVcsAdapter {
    async fn current_branch(&self, repo: &Path) -> Result<String, VcsError> {
        let out = self
            .git(repo, &["rev-parse", "--abbrev-ref", "HEAD"], "git rev-parse")
            .await?;
        Ok(out.trim().to_string())
    }

    async fn checkout(&self, repo: &Path, branch: &str) -> Result<(), VcsError> {
        self.git(repo, &["checkout", branch], "git checkout").await?;
        Ok(())
    }

    async fn merge(&self, repo: &Path, branch: &str) -> Result<(), VcsError> {
        self.git(repo, &["merge", "--no-edit", branch], "git merge").await?;
        Ok(())
    }

    async fn ensure_branch(&self, repo: &Path, branch: &str, from: &str) -> Result<(), VcsError> {
        if self.branch_exists(repo, branch).await? {
            return Ok(());
        }
        self.git(repo, &["branch", branch, from], "git branch").await?;
        Ok(())
    }

    async fn add_worktree(&self, repo: &Path, path: &Path, branch: &str) -> Result<(), VcsError> {
        let path_str = path.to_string_lossy().into_owned();
        self.git(repo, &["worktree", "add", &path_str, branch], "git worktree add")
            .await?;
        Ok(())
    }

    async fn remove_worktree(&self, repo: &Path, path: &Path) -> Result<(), VcsError> {
        let path_str = path.to_string_lossy().into_owned();
        self.git(repo, &["worktree", "remove", "--force", &path_str], "git worktree remove")
            .await?;
        Ok(())
    }

    async fn clean_worktrees(&self, repo: &Path, prefix: &str) -> Result<(), VcsError> {
        let listing = self.git(repo, &["worktree", "list", "--porcelain"], "git worktree list").await?;
        for line in listing.lines() {
            if let Some(path) = line.strip_prefix("worktree ") {
                let name = Path::new(path).file_name().and_then(|n| n.to_str()).unwrap_or("");
                if name.starts_with(prefix) {
                    let _ = self.remove_worktree(repo, Path::new(path)).await;
                }
            }
        }
        Ok(())
    }

    async fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, VcsError> {
        let mut cmd = Command::new("git");
        cmd.args(["show-ref", "--verify", "--quiet", &format!("refs/heads/{branch}")])
            .current_dir(repo);
        let output = run_with_timeout(cmd, GIT_COMMAND_TIMEOUT, "git show-ref").await?;
        Ok(output.status.success())
    }

    async fn fetch_prune(&self, repo: &Path) -> Result<(), VcsError> {
        self.git(repo, &["fetch", "--prune"], "git fetch --prune").await?;
        Ok(())
    }

    async fn merged_remote_branches(&self, repo: &Path, base: &str) -> Result<Vec<String>, VcsError> {
        let remote_ref = format!("origin/{base}");
        let out = self
            .git(repo, &["branch", "-r", "--merged", &remote_ref], "git branch --merged")
            .await?;
        Ok(parse_merged_remote_branches(&out, base))
    }

    async fn delete_remote_branch(&self, repo: &Path, branch: &str) -> Result<(), VcsError> {
        self.git(repo, &["push", "origin", "--delete", branch], "git push --delete")
            .await?;
        Ok(())
    }

    async fn delete_local_branch(&self, repo: &Path, branch: &str) -> Result<(), VcsError> {
        self.git(repo, &["branch", "-D", branch], "git branch -D").await?;
        Ok(())
    }
}

/// Parse `git branch -r --merged` output into bare branch names, dropping
/// the `origin/` remote prefix, the `origin/HEAD -> origin/<base>` alias
/// line, and `base` itself.
fn parse_merged_remote_branches(output: &str, base: &str) -> Vec<String> {
    output
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.contains("->"))
        .map(|l| l.trim_start_matches("origin/").to_string())
        .filter(|b| b != base)
        .collect()
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::{VcsAdapter, VcsError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum VcsCall {
        CurrentBranch(PathBuf),
        Checkout(PathBuf, String),
        Merge(PathBuf, String),
        EnsureBranch(PathBuf, String, String),
        AddWorktree(PathBuf, PathBuf, String),
        RemoveWorktree(PathBuf, PathBuf),
        CleanWorktrees(PathBuf, String),
        FetchPrune(PathBuf),
        DeleteRemoteBranch(PathBuf, String),
        DeleteLocalBranch(PathBuf, String),
    }

    struct FakeState {
        calls: Vec<VcsCall>,
        branches: HashSet<String>,
        merged_remote: Vec<String>,
        current_branch: String,
    }

    /// Records every call in-memory; follows the [`FakeNotifyAdapter`](crate::notify::FakeNotifyAdapter) pattern.
    #[derive(Clone)]
    pub struct FakeVcsAdapter {
        inner: Arc<Mutex<FakeState>>,
    }

    impl Default for FakeVcsAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeState {
                    calls: Vec::new(),
                    branches: HashSet::new(),
                    merged_remote: Vec::new(),
                    current_branch: "main".to_string(),
                })),
            }
        }
    }

    impl FakeVcsAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<VcsCall> {
            self.inner.lock().calls.clone()
        }

        pub fn set_merged_remote_branches(&self, branches: Vec<String>) {
            self.inner.lock().merged_remote = branches;
        }

        pub fn seed_branch(&self, branch: impl Into<String>) {
            self.inner.lock().branches.insert(branch.into());
        }
    }

    #[async_trait]
    impl VcsAdapter for FakeVcsAdapter {
        async fn current_branch(&self, repo: &Path) -> Result<String, VcsError> {
            let mut state = self.inner.lock();
            state.calls.push(VcsCall::CurrentBranch(repo.to_path_buf()));
            Ok(state.current_branch.clone())
        }

        async fn checkout(&self, repo: &Path, branch: &str) -> Result<(), VcsError> {
            let mut state = self.inner.lock();
            state.calls.push(VcsCall::Checkout(repo.to_path_buf(), branch.to_string()));
            state.current_branch = branch.to_string();
            Ok(())
        }

        async fn merge(&self, repo: &Path, branch: &str) -> Result<(), VcsError> {
            self.inner
                .lock()
                .calls
                .push(VcsCall::Merge(repo.to_path_buf(), branch.to_string()));
            Ok(())
        }

        async fn ensure_branch(&self, repo: &Path, branch: &str, from: &str) -> Result<(), VcsError> {
            let mut state = self.inner.lock();
            state
                .calls
                .push(VcsCall::EnsureBranch(repo.to_path_buf(), branch.to_string(), from.to_string()));
            state.branches.insert(branch.to_string());
            Ok(())
        }

        async fn add_worktree(&self, repo: &Path, path: &Path, branch: &str) -> Result<(), VcsError> {
            self.inner.lock().calls.push(VcsCall::AddWorktree(
                repo.to_path_buf(),
                path.to_path_buf(),
                branch.to_string(),
            ));
            Ok(())
        }

        async fn remove_worktree(&self, repo: &Path, path: &Path) -> Result<(), VcsError> {
            self.inner
                .lock()
                .calls
                .push(VcsCall::RemoveWorktree(repo.to_path_buf(), path.to_path_buf()));
            Ok(())
        }

        async fn clean_worktrees(&self, repo: &Path, prefix: &str) -> Result<(), VcsError> {
            self.inner
                .lock()
                .calls
                .push(VcsCall::CleanWorktrees(repo.to_path_buf(), prefix.to_string()));
            Ok(())
        }

        async fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, VcsError> {
            let _ = repo;
            Ok(self.inner.lock().branches.contains(branch))
        }

        async fn fetch_prune(&self, repo: &Path) -> Result<(), VcsError> {
            self.inner.lock().calls.push(VcsCall::FetchPrune(repo.to_path_buf()));
            Ok(())
        }

        async fn merged_remote_branches(&self, _repo: &Path, _base: &str) -> Result<Vec<String>, VcsError> {
            Ok(self.inner.lock().merged_remote.clone())
        }

        async fn delete_remote_branch(&self, repo: &Path, branch: &str) -> Result<(), VcsError> {
            self.inner
                .lock()
                .calls
                .push(VcsCall::DeleteRemoteBranch(repo.to_path_buf(), branch.to_string()));
            Ok(())
        }

        async fn delete_local_branch(&self, repo: &Path, branch: &str) -> Result<(), VcsError> {
            self.inner
                .lock()
                .calls
                .push(VcsCall::DeleteLocalBranch(repo.to_path_buf(), branch.to_string()));
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeVcsAdapter, VcsCall};

#[cfg(test)]
#[path = "vcs_tests.rs"]
mod tests;
