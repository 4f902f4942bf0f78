// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete [`TeamFactory`]: creates a worktree, spawns the team's engineer
//! under its own supervisor task, and tears both down on disband.

use overseer_adapters::AgentRuntime;
use overseer_core::{AgentId, AgentRole, AgentSpec, Clock, Config, Team, TeamError, TeamId};
use overseer_engine::{supervise, TeamFactory};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::orchestrator::DynRuntimeRef;

/// Bookkeeping for a live team's supervisor task, kept only so `teardown`
/// can stop the right process and clean up its worktree. Not part of
/// [`Team`] itself since the registry here is this factory's problem, not
/// the team manager's (matching its own doc comment).
struct LiveTeam {
    supervisor: CancellationToken,
    join: JoinHandle<()>,
    repo_path: PathBuf,
}

pub struct AgentTeamFactory<C: Clock> {
    runtime: Arc<dyn AgentRuntime>,
    vcs: Arc<dyn overseer_adapters::VcsAdapter>,
    config: Config,
    clock: C,
    live: Mutex<HashMap<TeamId, LiveTeam>>,
}

impl<C: Clock + 'static> AgentTeamFactory<C> {
    pub fn new(runtime: Arc<dyn AgentRuntime>, vcs: Arc<dyn overseer_adapters::VcsAdapter>, config: Config, clock: C) -> Self {
        Self { runtime, vcs, config, clock, live: Mutex::new(HashMap::new()) }
    }

    fn source_tree(&self, team_id: TeamId) -> &overseer_core::SourceTreeConfig {
        let trees = &self.config.source_trees;
        let index = (team_id.get() as usize - 1) % trees.len();
        &trees[index]
    }

    fn branch_name(&self, team_id: TeamId) -> String {
        match &self.config.feature_prefix {
            Some(prefix) => format!("{prefix}team-{team_id}"),
            None => format!("team-{team_id}"),
        }
    }
}

#[async_trait::async_trait]
impl<C: Clock + 'static> TeamFactory for AgentTeamFactory<C> {
    async fn build(&self, team_id: TeamId, issue_id: &str) -> Result<Team, TeamError> {
        let tree = self.source_tree(team_id);
        let branch = self.branch_name(team_id);
        let worktree_path = self.config.data_dir.join("worktrees").join(format!("team-{team_id}"));

        self.vcs
            .ensure_branch(&tree.path, &branch, &tree.develop_branch)
            .await
            .map_err(|error| TeamError::Factory(error.to_string()))?;
        self.vcs
            .add_worktree(&tree.path, &worktree_path, &branch)
            .await
            .map_err(|error| TeamError::Factory(error.to_string()))?;

        let engineer_id = AgentId::new(format!("engineer-{team_id}"));
        let vars = std::collections::HashMap::new();
        let system_prompt =
            overseer_prompt::render_system_prompt(&self.config.models.engineer_prompt_path, &vars).unwrap_or_default();
        let spec = AgentSpec {
            id: engineer_id.clone(),
            role: AgentRole::Engineer(team_id),
            model: self.config.models.engineer_model.clone(),
            cwd: worktree_path.clone(),
            system_prompt,
            context_reset_interval: self.config.context_reset_interval(),
        };

        let supervisor_ctx = CancellationToken::new();
        let task_ctx = supervisor_ctx.clone();
        let runtime = DynRuntimeRef::new(Arc::clone(&self.runtime));
        let kill_grace = self.config.agent_kill_grace();
        let join = tokio::spawn(async move {
            supervise(spec, &runtime, kill_grace, None, task_ctx).await;
        });

        self.live
            .lock()
            .insert(team_id, LiveTeam { supervisor: supervisor_ctx, join, repo_path: tree.path.clone() });

        Ok(Team::builder()
            .id(team_id)
            .issue_id(issue_id)
            .engineer(engineer_id)
            .worktree_path(worktree_path)
            .created_at_ms(self.clock.epoch_ms())
            .build())
    }

    async fn teardown(&self, team: &Team) {
        let Some(live) = self.live.lock().remove(&team.id) else {
            tracing::debug!(team_id = %team.id, "no live supervisor recorded for team, nothing to tear down");
            return;
        };
        live.supervisor.cancel();
        if tokio::time::timeout(self.config.agent_kill_grace(), live.join).await.is_err() {
            tracing::warn!(team_id = %team.id, "team supervisor did not wind down within the kill grace period");
        }
        if let Err(error) = self.vcs.remove_worktree(&live.repo_path, &team.worktree_path).await {
            tracing::warn!(team_id = %team.id, %error, "failed to remove team worktree during teardown");
        }
    }
}

#[cfg(test)]
#[path = "team_factory_tests.rs"]
mod tests;
