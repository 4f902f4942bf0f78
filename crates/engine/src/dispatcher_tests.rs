// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use overseer_adapters::FakeVcsAdapter;
use overseer_core::{AgentId, FakeClock, ModelConfig, SourceTreeConfig, Team, TeamErrorKind, TrackerConfig};
use overseer_storage::ChatLogFile;
use std::path::PathBuf;

struct OkFactory;

#[async_trait::async_trait]
impl TeamFactory for OkFactory {
    async fn build(&self, team_id: overseer_core::TeamId, issue_id: &str) -> Result<Team, overseer_core::TeamError> {
        Ok(Team::builder()
            .id(team_id)
            .issue_id(issue_id)
            .engineer(AgentId::new(format!("engineer-{team_id}")))
            .worktree_path(PathBuf::from(format!("/worktrees/team-{team_id}")))
            .build())
    }
}

fn test_config(source_trees: Vec<SourceTreeConfig>) -> Config {
    Config {
        max_teams: 4,
        data_dir: PathBuf::from("/tmp/overseer-test"),
        source_trees,
        idle_threshold_secs: 300,
        dormancy_threshold_secs: 3600,
        chatlog_max_lines: 500,
        context_reset_interval_secs: 7200,
        cleanup_interval_secs: 3600,
        main_check_interval_hours: 6,
        doc_check_interval_hours: 24,
        bash_timeout_minutes: 10,
        agent_kill_grace_secs: 15,
        feature_prefix: None,
        tracker: TrackerConfig {
            owner: "acme".to_string(),
            repos: vec!["widgets".to_string()],
            poll_interval_secs: 60,
            event_poll_interval_secs: 30,
            allowed_authors: Vec::new(),
            bot_detection_patterns: Vec::new(),
        },
        models: ModelConfig {
            superintendent_model: "model-a".to_string(),
            engineer_model: "model-b".to_string(),
            superintendent_prompt_path: PathBuf::from("superintendent.md"),
            engineer_prompt_path: PathBuf::from("engineer.md"),
        },
    }
}

fn harness(
    dir: &tempfile::TempDir,
    source_trees: Vec<SourceTreeConfig>,
) -> (CommandDispatcher<FakeClock>, FakeVcsAdapter) {
    let clock = FakeClock::new();
    let chatbus = ChatBus::new(ChatLogFile::new(dir.path().join("chat.log")), clock.clone());
    let issues = IssueStore::new(dir.path().join("issues"));
    let teams = Arc::new(TeamManager::new(4));
    let idle = Arc::new(IdleController::new(
        std::time::Duration::from_secs(300),
        std::time::Duration::from_secs(3600),
        clock,
    ));
    let fake_vcs = FakeVcsAdapter::new();
    let vcs: Arc<dyn VcsAdapter> = Arc::new(fake_vcs.clone());
    let config = Arc::new(parking_lot::RwLock::new(test_config(source_trees)));
    (CommandDispatcher::new(chatbus, issues, teams, idle, vcs, config), fake_vcs)
}

fn open_issue(id: &str) -> Issue {
    Issue::builder().id(IssueId::new(id)).title("fix it").build()
}

fn factory() -> Arc<dyn TeamFactory> {
    Arc::new(OkFactory)
}

#[test]
fn parses_known_commands() {
    assert_eq!(Command::parse("TEAM_CREATE 42"), Command::TeamCreate("42".to_string()));
    assert_eq!(Command::parse("TEAM_DISBAND 42"), Command::TeamDisband("42".to_string()));
    assert_eq!(Command::parse("RELEASE"), Command::Release);
    assert_eq!(Command::parse("WAKE_GITHUB"), Command::WakeGithub);
    assert_eq!(Command::parse("  TEAM_CREATE   7  "), Command::TeamCreate("7".to_string()));
}

#[test]
fn unrecognized_keyword_is_unknown() {
    assert_eq!(Command::parse("PING"), Command::Unknown("PING".to_string()));
}

#[tokio::test]
async fn team_create_succeeds_for_claimable_issue() {
    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _vcs) = harness(&dir, Vec::new());
    dispatcher.issues.put(&open_issue("42")).unwrap();

    dispatcher.dispatch(Command::TeamCreate("42".to_string()), factory()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let issue = dispatcher.issues.get(&IssueId::new("42")).unwrap().unwrap();
    assert_eq!(issue.assigned_team, 1);
    assert_eq!(issue.status, overseer_core::IssueStatus::InProgress);

    let acks = dispatcher.chatbus.poll("superintendent").unwrap();
    assert!(acks.iter().any(|m| m.body.contains("team 1 created for issue 42")));
}

#[tokio::test]
async fn team_create_rejects_missing_issue_id() {
    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _vcs) = harness(&dir, Vec::new());

    dispatcher.dispatch(Command::TeamCreate(String::new()), factory()).await.unwrap();

    let acks = dispatcher.chatbus.poll("superintendent").unwrap();
    assert!(acks.iter().any(|m| m.body.contains("requires an issue id")));
}

#[tokio::test]
async fn team_create_rejects_unknown_issue() {
    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _vcs) = harness(&dir, Vec::new());

    dispatcher.dispatch(Command::TeamCreate("ghost".to_string()), factory()).await.unwrap();

    let acks = dispatcher.chatbus.poll("superintendent").unwrap();
    assert!(acks.iter().any(|m| m.body.contains("no such issue ghost")));
}

#[tokio::test]
async fn team_create_rejects_closed_issue() {
    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _vcs) = harness(&dir, Vec::new());
    let mut issue = open_issue("42");
    issue.status = overseer_core::IssueStatus::Closed;
    dispatcher.issues.put(&issue).unwrap();

    dispatcher.dispatch(Command::TeamCreate("42".to_string()), factory()).await.unwrap();

    let acks = dispatcher.chatbus.poll("superintendent").unwrap();
    assert!(acks.iter().any(|m| m.body.contains("not claimable")));
}

#[tokio::test]
async fn team_create_rejects_already_assigned_issue() {
    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _vcs) = harness(&dir, Vec::new());
    let mut issue = open_issue("42");
    issue.assigned_team = 3;
    dispatcher.issues.put(&issue).unwrap();

    dispatcher.dispatch(Command::TeamCreate("42".to_string()), factory()).await.unwrap();

    let acks = dispatcher.chatbus.poll("superintendent").unwrap();
    assert!(acks.iter().any(|m| m.body.contains("already assigned to team 3")));
}

#[tokio::test]
async fn team_disband_clears_assignment_and_acks() {
    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _vcs) = harness(&dir, Vec::new());
    dispatcher.issues.put(&open_issue("42")).unwrap();
    dispatcher.dispatch(Command::TeamCreate("42".to_string()), factory()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    dispatcher.dispatch(Command::TeamDisband("42".to_string()), factory()).await.unwrap();

    let issue = dispatcher.issues.get(&IssueId::new("42")).unwrap().unwrap();
    assert_eq!(issue.assigned_team, 0);
    let acks = dispatcher.chatbus.poll("superintendent").unwrap();
    assert!(acks.iter().any(|m| m.body.contains("disbanded for issue 42")));
}

#[tokio::test]
async fn team_disband_unbound_issue_reports_failure_kind() {
    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _vcs) = harness(&dir, Vec::new());

    dispatcher.dispatch(Command::TeamDisband("nope".to_string()), factory()).await.unwrap();

    let acks = dispatcher.chatbus.poll("superintendent").unwrap();
    assert!(acks.iter().any(|m| m.body.contains("TEAM_DISBAND nope failed")));
    let _ = TeamErrorKind::NotFound;
}

#[tokio::test]
async fn release_checks_out_main_and_merges_develop_per_source_tree() {
    let dir = tempfile::tempdir().unwrap();
    let source_trees = vec![SourceTreeConfig {
        path: PathBuf::from("/repo/widgets"),
        develop_branch: "develop".to_string(),
    }];
    let (dispatcher, vcs) = harness(&dir, source_trees);

    dispatcher.dispatch(Command::Release, factory()).await.unwrap();

    let calls = vcs.calls();
    assert!(calls.iter().any(|c| matches!(c, overseer_adapters::VcsCall::Checkout(path, branch)
        if path == std::path::Path::new("/repo/widgets") && branch == "main")));
    assert!(calls.iter().any(|c| matches!(c, overseer_adapters::VcsCall::Merge(path, branch)
        if path == std::path::Path::new("/repo/widgets") && branch == "develop")));
}

#[tokio::test]
async fn wake_github_clears_idle_state() {
    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _vcs) = harness(&dir, Vec::new());
    dispatcher.idle.set_has_issues(false);

    dispatcher.dispatch(Command::WakeGithub, factory()).await.unwrap();

    assert!(!dispatcher.idle.is_idle());
}

#[tokio::test]
async fn unknown_command_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let (dispatcher, _vcs) = harness(&dir, Vec::new());

    dispatcher.dispatch(Command::Unknown("PING".to_string()), factory()).await.unwrap();

    assert!(dispatcher.chatbus.poll("superintendent").unwrap().is_empty());
}
