// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[test]
fn parse_merged_remote_branches_skips_head_alias_and_base() {
    let output = "  origin/HEAD -> origin/develop\n  origin/develop\n  origin/feature/foo\n  origin/feature/bar\n";
    let branches = parse_merged_remote_branches(output, "develop");
    assert_eq!(branches, vec!["feature/foo", "feature/bar"]);
}

#[test]
fn parse_merged_remote_branches_on_empty_output() {
    assert!(parse_merged_remote_branches("", "develop").is_empty());
}

#[tokio::test]
async fn fake_checkout_updates_current_branch() {
    let vcs = FakeVcsAdapter::new();
    vcs.checkout(Path::new("/repo"), "feature/x").await.unwrap();
    assert_eq!(vcs.current_branch(Path::new("/repo")).await.unwrap(), "feature/x");
}

#[tokio::test]
async fn fake_ensure_branch_then_branch_exists() {
    let vcs = FakeVcsAdapter::new();
    assert!(!vcs.branch_exists(Path::new("/repo"), "feature/x").await.unwrap());

    vcs.ensure_branch(Path::new("/repo"), "feature/x", "main").await.unwrap();
    assert!(vcs.branch_exists(Path::new("/repo"), "feature/x").await.unwrap());
}

#[tokio::test]
async fn fake_records_calls_in_order() {
    let vcs = FakeVcsAdapter::new();
    vcs.fetch_prune(Path::new("/repo")).await.unwrap();
    vcs.delete_remote_branch(Path::new("/repo"), "feature/x").await.unwrap();
    vcs.delete_local_branch(Path::new("/repo"), "feature/x").await.unwrap();

    let calls = vcs.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[0], VcsCall::FetchPrune(_)));
    assert!(matches!(calls[1], VcsCall::DeleteRemoteBranch(_, _)));
    assert!(matches!(calls[2], VcsCall::DeleteLocalBranch(_, _)));
}

#[tokio::test]
async fn fake_merged_remote_branches_returns_seeded_list() {
    let vcs = FakeVcsAdapter::new();
    vcs.set_merged_remote_branches(vec!["feature/done".to_string()]);
    let branches = vcs.merged_remote_branches(Path::new("/repo"), "develop").await.unwrap();
    assert_eq!(branches, vec!["feature/done"]);
}
