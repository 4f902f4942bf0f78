// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use overseer_adapters::{Comment, FakeTrackerAdapter, RemoteIssue, TrackerEvent};
use overseer_core::{FakeClock, IssueFilter};
use overseer_storage::ChatLogFile;

fn store(dir: &tempfile::TempDir) -> IssueStore {
    IssueStore::new(dir.path().join("issues"))
}

#[test]
fn reconcile_creates_new_issues_as_open() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    reconcile(
        &store,
        vec![RemoteIssue {
            id: "1".to_string(),
            title: "fix the thing".to_string(),
            body: "details".to_string(),
            url: "https://example.invalid/1".to_string(),
        }],
    )
    .unwrap();

    let issue = store.get(&IssueId::new("1")).unwrap().unwrap();
    assert_eq!(issue.title, "fix the thing");
    assert_eq!(issue.status, IssueStatus::Open);
}

#[test]
fn reconcile_updates_existing_issue_without_touching_assignment() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let mut existing = Issue::builder().id(IssueId::new("1")).title("old title").build();
    existing.assigned_team = 3;
    existing.status = IssueStatus::InProgress;
    store.put(&existing).unwrap();

    reconcile(
        &store,
        vec![RemoteIssue {
            id: "1".to_string(),
            title: "new title".to_string(),
            body: "updated body".to_string(),
            url: "https://example.invalid/1".to_string(),
        }],
    )
    .unwrap();

    let issue = store.get(&IssueId::new("1")).unwrap().unwrap();
    assert_eq!(issue.title, "new title");
    assert_eq!(issue.assigned_team, 3);
    assert_eq!(issue.status, IssueStatus::InProgress);
}

#[test]
fn comment_filter_suppresses_bot_authors() {
    let filter = CommentFilter::new(Vec::new(), &[]);
    assert!(!filter.passes("dependabot[bot]", "hello", IssueStatus::Open));
    assert!(filter.passes("alice", "hello", IssueStatus::Open));
}

#[test]
fn comment_filter_suppresses_closed_and_resolved_issues() {
    let filter = CommentFilter::new(Vec::new(), &[]);
    assert!(!filter.passes("alice", "hello", IssueStatus::Closed));
    assert!(!filter.passes("alice", "hello", IssueStatus::Resolved));
}

#[test]
fn comment_filter_allowlist_overrides_bot_suppression() {
    let filter = CommentFilter::new(vec!["release-bot[bot]".to_string()], &[]);
    assert!(filter.passes("release-bot[bot]", "hello", IssueStatus::Open));
}

#[test]
fn comment_filter_regex_patterns_mark_comments_as_bot() {
    let filter = CommentFilter::new(Vec::new(), &["^\\[automated\\]".to_string()]);
    assert!(!filter.passes("alice", "[automated] nightly report", IssueStatus::Open));
    assert!(filter.passes("alice", "looks good to me", IssueStatus::Open));
}

#[test]
fn seen_comments_deduplicates_by_issue_and_comment_id() {
    let mut seen = SeenComments::new();
    assert!(seen.insert_if_new("1", "c1"));
    assert!(!seen.insert_if_new("1", "c1"));
    assert!(seen.insert_if_new("1", "c2"));
    assert!(seen.insert_if_new("2", "c1"));
}

fn chatbus(dir: &tempfile::TempDir) -> crate::chatbus::ChatBus<FakeClock> {
    crate::chatbus::ChatBus::new(ChatLogFile::new(dir.path().join("chat.log")), FakeClock::new())
}

#[tokio::test]
async fn pull_request_event_closes_issue_and_disbands_team() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    store.put(&Issue::builder().id(IssueId::new("1")).status(IssueStatus::InProgress).build()).unwrap();

    let teams = TeamManager::new(4);
    let team_id = teams.create("1", &NoopFactory).await;
    assert!(team_id.is_ok());

    let bus = chatbus(&dir);
    let filter = CommentFilter::new(Vec::new(), &[]);
    let mut seen = SeenComments::new();

    handle_event(
        TrackerEvent { kind: TrackerEventKind::PullRequest, issue_id: "1".to_string(), comment: None },
        &store,
        &teams,
        &bus,
        &filter,
        &NoopFactory,
        &mut seen,
    )
    .await;

    let issue = store.get(&IssueId::new("1")).unwrap().unwrap();
    assert_eq!(issue.status, IssueStatus::Closed);
    assert!(!teams.has_issue("1"));
}

#[tokio::test]
async fn issue_comment_event_forwards_to_superintendent_and_assigned_engineer() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let mut issue = Issue::builder().id(IssueId::new("1")).status(IssueStatus::InProgress).build();
    issue.assigned_team = 2;
    store.put(&issue).unwrap();

    let teams = TeamManager::new(4);
    let bus = chatbus(&dir);
    let filter = CommentFilter::new(Vec::new(), &[]);
    let mut seen = SeenComments::new();

    handle_event(
        TrackerEvent {
            kind: TrackerEventKind::IssueComment,
            issue_id: "1".to_string(),
            comment: Some(Comment { id: "c1".to_string(), author: "alice".to_string(), body: "ping".to_string() }),
        },
        &store,
        &teams,
        &bus,
        &filter,
        &NoopFactory,
        &mut seen,
    )
    .await;

    assert!(bus.poll("superintendent").unwrap().iter().any(|m| m.body.contains("ping")));
    assert!(bus.poll("engineer-2").unwrap().iter().any(|m| m.body.contains("ping")));
}

#[tokio::test]
async fn issue_comment_event_deduplicates_repeated_delivery() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    store.put(&Issue::builder().id(IssueId::new("1")).status(IssueStatus::Open).build()).unwrap();

    let teams = TeamManager::new(4);
    let bus = chatbus(&dir);
    let filter = CommentFilter::new(Vec::new(), &[]);
    let mut seen = SeenComments::new();
    let event = TrackerEvent {
        kind: TrackerEventKind::IssueComment,
        issue_id: "1".to_string(),
        comment: Some(Comment { id: "c1".to_string(), author: "alice".to_string(), body: "ping".to_string() }),
    };

    handle_event(event.clone(), &store, &teams, &bus, &filter, &NoopFactory, &mut seen).await;
    handle_event(event, &store, &teams, &bus, &filter, &NoopFactory, &mut seen).await;

    assert_eq!(bus.poll("superintendent").unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_loop_stops_immediately_when_cancelled_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let tracker: Arc<dyn IssueTrackerAdapter> = Arc::new(FakeTrackerAdapter::new());
    let idle = Arc::new(IdleController::new(Duration::from_secs(1), Duration::from_secs(1), FakeClock::new()));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let task = tokio::spawn(sync_loop(
        tracker,
        store,
        idle,
        "acme".to_string(),
        vec!["widgets".to_string()],
        Duration::from_secs(60),
        cancel,
    ));
    tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}

struct NoopFactory;

#[async_trait::async_trait]
impl crate::team_manager::TeamFactory for NoopFactory {
    async fn build(
        &self,
        team_id: overseer_core::TeamId,
        issue_id: &str,
    ) -> Result<overseer_core::Team, overseer_core::TeamError> {
        Ok(overseer_core::Team::builder()
            .id(team_id)
            .issue_id(issue_id)
            .engineer(overseer_core::AgentId::new(format!("engineer-{team_id}")))
            .worktree_path(std::path::PathBuf::from(format!("/worktrees/team-{team_id}")))
            .build())
    }
}

