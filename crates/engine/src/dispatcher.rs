// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses and executes operator commands arriving on the chat-log bus
//! addressed to `orchestrator`.

use crate::chatbus::{ChatBus, ChatBusError};
use crate::idle_controller::IdleController;
use crate::team_manager::{TeamFactory, TeamManager};
use overseer_adapters::{VcsAdapter, VcsError};
use overseer_core::{Clock, Config, Issue, IssueId, IssueStatus};
use overseer_storage::{IssueStore, IssueStoreError};
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    TeamCreate(String),
    TeamDisband(String),
    Release,
    WakeGithub,
    Unknown(String),
}

impl Command {
    pub fn parse(body: &str) -> Self {
        let body = body.trim();
        let mut parts = body.splitn(2, char::is_whitespace);
        match parts.next().unwrap_or("") {
            "TEAM_CREATE" => Command::TeamCreate(parts.next().unwrap_or("").trim().to_string()),
            "TEAM_DISBAND" => Command::TeamDisband(parts.next().unwrap_or("").trim().to_string()),
            "RELEASE" => Command::Release,
            "WAKE_GITHUB" => Command::WakeGithub,
            _ => Command::Unknown(body.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    ChatBus(#[from] ChatBusError),
    #[error(transparent)]
    IssueStore(#[from] IssueStoreError),
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// Executes commands arriving on the `orchestrator` recipient of the
/// chat-log bus. Holds everything a command might touch: the issue
/// store, the team pool, the idle controller, and the source trees'
/// version-control adapter.
pub struct CommandDispatcher<C: Clock> {
    chatbus: ChatBus<C>,
    issues: IssueStore,
    teams: Arc<TeamManager>,
    idle: Arc<IdleController<C>>,
    vcs: Arc<dyn VcsAdapter>,
    /// Shared with the config hot-reload watcher, so `RELEASE` always
    /// iterates the source trees from the most recently validated config.
    config: Arc<RwLock<Config>>,
}

impl<C: Clock + 'static> CommandDispatcher<C> {
    pub fn new(
        chatbus: ChatBus<C>,
        issues: IssueStore,
        teams: Arc<TeamManager>,
        idle: Arc<IdleController<C>>,
        vcs: Arc<dyn VcsAdapter>,
        config: Arc<RwLock<Config>>,
    ) -> Self {
        Self { chatbus, issues, teams, idle, vcs, config }
    }

    /// Validate and execute one command, reporting rejection or
    /// acknowledgement on the bus as spelled out per-variant below.
    pub async fn dispatch(&self, command: Command, factory: Arc<dyn TeamFactory>) -> Result<(), DispatchError> {
        match command {
            Command::TeamCreate(issue_id) => self.handle_team_create(issue_id, factory),
            Command::TeamDisband(issue_id) => self.handle_team_disband(issue_id, factory.as_ref()).await,
            Command::Release => self.handle_release().await,
            Command::WakeGithub => {
                self.idle.wake();
                Ok(())
            }
            Command::Unknown(body) => {
                tracing::info!(%body, "ignoring unknown orchestrator command");
                Ok(())
            }
        }
    }

    /// Validates synchronously (the reservation in `teams.create` is
    /// itself synchronous) and reserves the issue, then hands the
    /// potentially minutes-long `factory.build` call to a spawned task so
    /// a slow worktree/branch setup can't stall the command loop behind it.
    fn handle_team_create(&self, issue_id: String, factory: Arc<dyn TeamFactory>) -> Result<(), DispatchError> {
        let issue = match self.validate_team_create(&issue_id)? {
            Ok(issue) => issue,
            Err(reason) => {
                self.reject(&issue_id, &reason)?;
                return Ok(());
            }
        };

        let mut in_progress = issue;
        in_progress.status = IssueStatus::InProgress;
        self.issues.put(&in_progress)?;

        let teams = Arc::clone(&self.teams);
        let issues = self.issues.clone();
        let chatbus = self.chatbus.clone();
        tokio::spawn(async move {
            match teams.create(issue_id.clone(), factory.as_ref()).await {
                Ok(team_id) => {
                    if let Ok(Some(mut issue)) = issues.get(&IssueId::new(&issue_id)) {
                        issue.assigned_team = team_id.get();
                        let _ = issues.put(&issue);
                    }
                    let _ = chatbus.append(
                        "orchestrator",
                        "superintendent",
                        &format!("team {team_id} created for issue {issue_id}"),
                    );
                }
                Err(error) => {
                    let _ = chatbus.append(
                        "orchestrator",
                        "superintendent",
                        &format!("failed to create a team for issue {issue_id}: {error}"),
                    );
                }
            }
        });
        Ok(())
    }

    /// The (a)-(e) pre-validation chain. `Ok(Ok(issue))` means every check
    /// passed; `Ok(Err(reason))` is a human-readable rejection to post
    /// back to the bus; `Err` is an infrastructure failure.
    fn validate_team_create(&self, issue_id: &str) -> Result<Result<Issue, String>, DispatchError> {
        if issue_id.is_empty() {
            return Ok(Err("TEAM_CREATE requires an issue id".to_string()));
        }
        let issue = match self.issues.get(&IssueId::new(issue_id))? {
            Some(issue) => issue,
            None => return Ok(Err(format!("no such issue {issue_id}"))),
        };
        if matches!(issue.status, IssueStatus::Closed | IssueStatus::Resolved) {
            return Ok(Err(format!("issue {issue_id} is {}, not claimable", issue.status)));
        }
        if issue.assigned_team != 0 {
            return Ok(Err(format!("issue {issue_id} is already assigned to team {}", issue.assigned_team)));
        }
        if self.teams.has_issue(issue_id) {
            return Ok(Err(format!("a team is already being created for issue {issue_id}")));
        }
        Ok(Ok(issue))
    }

    fn reject(&self, issue_id: &str, reason: &str) -> Result<(), DispatchError> {
        tracing::info!(%issue_id, %reason, "rejecting TEAM_CREATE");
        self.chatbus
            .append("orchestrator", "superintendent", &format!("TEAM_CREATE {issue_id} rejected: {reason}"))?;
        Ok(())
    }

    async fn handle_team_disband(&self, issue_id: String, factory: &dyn TeamFactory) -> Result<(), DispatchError> {
        match self.teams.disband_by_issue(&issue_id) {
            Ok(team) => {
                factory.teardown(&team).await;
                if let Some(mut issue) = self.issues.get(&IssueId::new(&issue_id))? {
                    issue.assigned_team = 0;
                    self.issues.put(&issue)?;
                }
                self.chatbus.append(
                    "orchestrator",
                    "superintendent",
                    &format!("team {} disbanded for issue {issue_id}", team.id),
                )?;
            }
            Err(error) => {
                self.chatbus
                    .append("orchestrator", "superintendent", &format!("TEAM_DISBAND {issue_id} failed: {error}"))?;
            }
        }
        Ok(())
    }

    async fn handle_release(&self) -> Result<(), DispatchError> {
        let source_trees = self.config.read().source_trees.clone();
        for tree in &source_trees {
            if let Err(error) = self.vcs.checkout(&tree.path, "main").await {
                tracing::warn!(path = %tree.path.display(), %error, "RELEASE checkout main failed");
                continue;
            }
            if let Err(error) = self.vcs.merge(&tree.path, &tree.develop_branch).await {
                tracing::warn!(path = %tree.path.display(), branch = %tree.develop_branch, %error, "RELEASE merge conflict");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
