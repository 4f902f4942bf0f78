// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background maintenance loops and the two boot-only cleanup passes.

use crate::chatbus::ChatBus;
use overseer_adapters::{VcsAdapter, VcsError};
use overseer_core::{Clock, Config, IssueFilter, IssueStatus};
use overseer_storage::{IssueStore, IssueStoreError};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub async fn chatlog_truncator<C: Clock>(
    chatbus: ChatBus<C>,
    max_lines: usize,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        if let Err(error) = chatbus.truncate(max_lines) {
            tracing::warn!(%error, "chat-log truncation failed");
        }
    }
}

pub async fn branch_cleaner(
    vcs: Arc<dyn VcsAdapter>,
    config: Config,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        for tree in &config.source_trees {
            if let Err(error) = clean_source_tree(&*vcs, &tree.path, &tree.develop_branch, config.feature_prefix.as_deref()).await {
                tracing::warn!(path = %tree.path.display(), %error, "branch cleanup failed");
            }
        }
    }
}

async fn clean_source_tree(
    vcs: &dyn VcsAdapter,
    repo: &Path,
    develop_branch: &str,
    feature_prefix: Option<&str>,
) -> Result<(), VcsError> {
    vcs.fetch_prune(repo).await?;
    let merged = vcs.merged_remote_branches(repo, develop_branch).await?;
    for branch in merged {
        if branch == "main" || branch == develop_branch {
            continue;
        }
        if let Some(prefix) = feature_prefix {
            if !branch.starts_with(prefix) {
                continue;
            }
        }
        if let Err(error) = vcs.delete_remote_branch(repo, &branch).await {
            tracing::warn!(%branch, %error, "failed to delete remote branch");
            continue;
        }
        if let Err(error) = vcs.delete_local_branch(repo, &branch).await {
            tracing::debug!(%branch, %error, "no local copy of merged branch to delete");
        }
    }
    Ok(())
}

const MAIN_BRANCH_CHECK_PROMPT: &str =
    "Please run the build and test suite on main to confirm it is still green.";
const DOC_CHECK_PROMPT: &str = "Please review recent changes on main for documentation that needs updating.";

pub async fn main_branch_check<C: Clock>(chatbus: ChatBus<C>, interval: Duration, cancel: CancellationToken) {
    canned_prompt_loop(chatbus, MAIN_BRANCH_CHECK_PROMPT, interval, cancel).await
}

pub async fn doc_check<C: Clock>(chatbus: ChatBus<C>, interval: Duration, cancel: CancellationToken) {
    canned_prompt_loop(chatbus, DOC_CHECK_PROMPT, interval, cancel).await
}

async fn canned_prompt_loop<C: Clock>(
    chatbus: ChatBus<C>,
    prompt: &str,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        if let Err(error) = chatbus.append("orchestrator", "superintendent", prompt) {
            tracing::warn!(%error, "failed to post canned janitor prompt");
        }
    }
}

/// Boot-only: delete every issue with status `closed`.
pub fn prune_closed_issues(store: &IssueStore) -> Result<usize, IssueStoreError> {
    let closed = store.list(&IssueFilter { status: Some(IssueStatus::Closed), ..Default::default() })?;
    let count = closed.len();
    for issue in closed {
        store.remove(&issue.id)?;
    }
    Ok(count)
}

/// Boot-only: remove worktrees left over from a prior run, named with
/// `team_prefix` (e.g. `team-3`).
pub async fn purge_stale_worktrees(
    vcs: &dyn VcsAdapter,
    source_trees: &[overseer_core::SourceTreeConfig],
    team_prefix: &str,
) -> Result<(), VcsError> {
    for tree in source_trees {
        vcs.clean_worktrees(&tree.path, team_prefix).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "janitors_tests.rs"]
mod tests;
