// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn issue(id: &str) -> RemoteIssue {
    RemoteIssue { id: id.to_string(), title: "t".to_string(), body: "b".to_string(), url: format!("https://example.invalid/{id}") }
}

#[tokio::test]
async fn fake_tracker_returns_seeded_open_issues() {
    let tracker = FakeTrackerAdapter::new();
    tracker.set_open_issues(vec![issue("1"), issue("2")]);

    let issues = tracker.list_open_issues("acme", &["widgets".to_string()]).await.unwrap();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].id, "1");
}

#[tokio::test]
async fn fake_tracker_drains_queued_events_once() {
    let tracker = FakeTrackerAdapter::new();
    tracker.push_events(vec![TrackerEvent { kind: TrackerEventKind::Issues, issue_id: "7".to_string(), comment: None }]);

    let first = tracker.stream_events("acme", &["widgets".to_string()]).await.unwrap();
    assert_eq!(first.len(), 1);

    let second = tracker.stream_events("acme", &["widgets".to_string()]).await.unwrap();
    assert!(second.is_empty());
}

#[tokio::test]
async fn fake_tracker_starts_with_no_issues_or_events() {
    let tracker = FakeTrackerAdapter::new();
    assert!(tracker.list_open_issues("acme", &["widgets".to_string()]).await.unwrap().is_empty());
    assert!(tracker.stream_events("acme", &["widgets".to_string()]).await.unwrap().is_empty());
}

#[test]
fn http_tracker_adapter_builds_with_custom_base_url() {
    let adapter = HttpTrackerAdapter::new("https://tracker.example.invalid", "token123").unwrap();
    assert_eq!(adapter.base_url, "https://tracker.example.invalid");
}
