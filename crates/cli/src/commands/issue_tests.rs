// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use overseer_core::Issue;

fn store() -> (tempfile::TempDir, IssueStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = IssueStore::new(dir.path().join("issues"));
    (dir, store)
}

#[test]
fn list_reports_no_issues_found_when_store_is_empty() {
    let (_dir, store) = store();
    let result = list(&store, None, false, false, 50, false, OutputFormat::Text);
    assert!(result.is_ok());
}

#[test]
fn show_errors_when_the_issue_is_not_mirrored_locally() {
    let (_dir, store) = store();
    let result = show(&store, "missing", OutputFormat::Text);
    assert!(result.is_err());
}

#[test]
fn show_renders_a_stored_issue() {
    let (_dir, store) = store();
    let issue = Issue::builder().id(overseer_core::IssueId::new("7")).title("fix the thing").build();
    store.put(&issue).unwrap();

    let result = show(&store, "7", OutputFormat::Text);
    assert!(result.is_ok());
}
