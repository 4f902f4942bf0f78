// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boot sequence and main wait loop. `Orchestrator::run` wires together
//! every piece the engine crate exposes and owns their cancellation.

use overseer_adapters::{AgentRuntime, IssueTrackerAdapter, VcsAdapter};
use overseer_core::{AgentId, AgentRole, AgentSpec, Clock, Config, IssueFilter, IssueId, IssueStatus};
use overseer_engine::{
    branch_cleaner, chatlog_truncator, doc_check, event_loop, main_branch_check, prune_closed_issues,
    purge_stale_worktrees, spawn_config_watcher, supervise, sync_loop, ChatBus, Command, CommandDispatcher,
    CommentFilter, IdleController, TeamFactory, TeamManager,
};
use overseer_storage::IssueStore;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::team_factory::AgentTeamFactory;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to prepare data directory {path}: {source}")]
    DataDir { path: std::path::PathBuf, source: std::io::Error },
    #[error(transparent)]
    ChatBus(#[from] overseer_engine::ChatBusError),
    #[error(transparent)]
    IssueStore(#[from] overseer_storage::IssueStoreError),
    #[error(transparent)]
    Vcs(#[from] overseer_adapters::VcsError),
}

/// Everything the orchestrator needs to start; built by `main.rs` from the
/// resolved config and the concrete adapters.
pub struct Orchestrator<C: Clock> {
    pub config: Config,
    /// Where `config` was loaded from; re-polled by the hot-reload watcher
    /// started in step 10.
    pub config_path: PathBuf,
    pub clock: C,
    pub vcs: Arc<dyn VcsAdapter>,
    pub tracker: Arc<dyn IssueTrackerAdapter>,
    pub runtime: Arc<dyn AgentRuntime>,
}

impl<C: Clock + 'static> Orchestrator<C> {
    /// Runs steps 1-11 of the boot sequence, then blocks until `ctx` is
    /// cancelled. Startup cancellation (during steps 6-7) is not an error:
    /// the function returns `Ok(())` either way.
    pub async fn run(self, ctx: CancellationToken) -> Result<(), OrchestratorError> {
        let config = &self.config;

        // Step 1: ensure data subdirectories exist.
        tracing::info!(step = 1, "ensuring data subdirectories exist");
        let issues_dir = config.data_dir.join("issues");
        let memos_dir = config.data_dir.join("memos");
        ensure_dir(&issues_dir)?;
        ensure_dir(&memos_dir)?;

        let chatbus = ChatBus::new(
            overseer_storage::ChatLogFile::new(config.data_dir.join("chatlog.txt")),
            self.clock.clone(),
        );
        let issues = IssueStore::new(issues_dir);

        // Step 2: truncate the chat log.
        tracing::info!(step = 2, "truncating chat log from a prior run");
        chatbus.truncate(0)?;

        // Step 3: prune closed issues.
        tracing::info!(step = 3, "pruning closed issues");
        let pruned = prune_closed_issues(&issues)?;
        tracing::info!(pruned, "closed issues pruned");

        // Step 4: clean stale worktrees.
        tracing::info!(step = 4, "purging stale worktrees from a prior run");
        purge_stale_worktrees(self.vcs.as_ref(), &config.source_trees, team_prefix()).await?;

        // Step 5: ensure each source tree is on its develop branch.
        tracing::info!(step = 5, "checking out develop branches");
        for tree in &config.source_trees {
            self.vcs.checkout(&tree.path, &tree.develop_branch).await?;
        }

        let idle = Arc::new(IdleController::new(config.idle_threshold(), config.dormancy_threshold(), self.clock.clone()));
        let teams = Arc::new(TeamManager::new(config.max_teams));
        let factory = Arc::new(AgentTeamFactory::new(
            Arc::clone(&self.runtime),
            Arc::clone(&self.vcs),
            config.clone(),
            self.clock.clone(),
        ));

        // Step 6: start resident agents (the superintendent).
        tracing::info!(step = 6, "starting resident agents");
        let superintendent_ready = Arc::new(Notify::new());
        let superintendent_spec = self.superintendent_spec()?;
        let agents_ctx = ctx.child_token();
        let superintendent_runtime = DynRuntimeRef::new(Arc::clone(&self.runtime));
        let superintendent_kill_grace = config.agent_kill_grace();
        let superintendent_ctx = agents_ctx.clone();
        let superintendent_ready_handle = Arc::clone(&superintendent_ready);
        tokio::spawn(async move {
            supervise(
                superintendent_spec,
                &superintendent_runtime,
                superintendent_kill_grace,
                Some(superintendent_ready_handle),
                superintendent_ctx,
            )
            .await;
        });

        // Step 7: fire-and-forget team creation for claimable issues.
        tracing::info!(step = 7, "launching team creation for claimable issues");
        self.start_all_teams(&issues, &teams, &factory).await?;

        // Step 8: startup cancellation short-circuits to a clean shutdown.
        if ctx.is_cancelled() {
            tracing::info!("cancelled during startup, skipping readiness barrier");
            agents_ctx.cancel();
            return Ok(());
        }

        // Step 9: barrier on resident-agent readiness.
        tracing::info!(step = 9, "waiting for resident agents to report ready");
        tokio::select! {
            _ = superintendent_ready.notified() => {}
            _ = ctx.cancelled() => {
                agents_ctx.cancel();
                return Ok(());
            }
        }

        // Step 10: launch the periodic background loops, including the
        // config hot-reload watcher.
        tracing::info!(step = 10, "starting pollers and janitors");
        let shared_config = Arc::new(RwLock::new(self.config.clone()));
        self.spawn_background_loops(&chatbus, &issues, &teams, &idle, &factory, &shared_config, ctx.clone());

        // Step 11: block until cancelled, then let every child task unwind.
        tracing::info!(step = 11, "orchestrator running");
        ctx.cancelled().await;
        tracing::info!("shutdown requested, waiting for background tasks to wind down");
        agents_ctx.cancel();
        Ok(())
    }

    async fn start_all_teams(
        &self,
        issues: &IssueStore,
        teams: &Arc<TeamManager>,
        factory: &Arc<AgentTeamFactory<C>>,
    ) -> Result<(), OrchestratorError> {
        let claimable = issues.list(&IssueFilter { status: None, ..Default::default() })?;
        let mut started = 0;
        for mut issue in claimable {
            if started >= self.config.max_teams {
                break;
            }
            if issue.pending_approval || !matches!(issue.status, IssueStatus::Open | IssueStatus::InProgress) {
                continue;
            }
            issue.status = IssueStatus::InProgress;
            issues.put(&issue)?;
            started += 1;

            let teams = Arc::clone(teams);
            let factory = Arc::clone(factory);
            let issues = issues.clone();
            let issue_id = issue.id.as_str().to_string();
            tokio::spawn(async move {
                match teams.create(issue_id.clone(), factory.as_ref()).await {
                    Ok(team_id) => {
                        if let Ok(Some(mut issue)) = issues.get(&IssueId::new(&issue_id)) {
                            issue.assigned_team = team_id.get();
                            let _ = issues.put(&issue);
                        }
                    }
                    Err(error) => {
                        tracing::warn!(%issue_id, %error, "failed to start a team for a claimable issue at boot");
                    }
                }
            });
        }

        for _ in started..self.config.max_teams {
            let teams = Arc::clone(teams);
            let factory = Arc::clone(factory);
            tokio::spawn(async move {
                if let Err(error) = teams.create(String::new(), factory.as_ref()).await {
                    tracing::warn!(%error, "failed to start a standby team at boot");
                }
            });
        }
        Ok(())
    }

    fn superintendent_spec(&self) -> Result<AgentSpec, OrchestratorError> {
        let cwd = self
            .config
            .source_trees
            .first()
            .map(|tree| tree.path.clone())
            .unwrap_or_else(|| self.config.data_dir.clone());
        let vars = std::collections::HashMap::new();
        let system_prompt = overseer_prompt::render_system_prompt(&self.config.models.superintendent_prompt_path, &vars)
            .unwrap_or_default();
        Ok(AgentSpec {
            id: AgentId::new("superintendent"),
            role: AgentRole::Superintendent,
            model: self.config.models.superintendent_model.clone(),
            cwd,
            system_prompt,
            context_reset_interval: self.config.context_reset_interval(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_background_loops(
        &self,
        chatbus: &ChatBus<C>,
        issues: &IssueStore,
        teams: &Arc<TeamManager>,
        idle: &Arc<IdleController<C>>,
        factory: &Arc<AgentTeamFactory<C>>,
        shared_config: &Arc<RwLock<Config>>,
        ctx: CancellationToken,
    ) {
        let config = &self.config;

        match spawn_config_watcher(self.config_path.clone(), ctx.clone()) {
            Ok((_, mut config_rx)) => {
                let shared_config = Arc::clone(shared_config);
                tokio::spawn(async move {
                    while config_rx.changed().await.is_ok() {
                        let updated = config_rx.borrow().clone();
                        *shared_config.write() = updated;
                        tracing::info!("config hot-reload: applied updated config");
                    }
                });
            }
            Err(error) => {
                tracing::warn!(%error, "failed to start config hot-reload watcher, keeping boot-time config");
            }
        }
        let filter = CommentFilter::new(config.tracker.allowed_authors.clone(), &config.tracker.bot_detection_patterns);

        tokio::spawn(sync_loop(
            Arc::clone(&self.tracker),
            issues.clone(),
            Arc::clone(idle),
            config.tracker.owner.clone(),
            config.tracker.repos.clone(),
            Duration::from_secs(config.tracker.poll_interval_secs),
            ctx.clone(),
        ));

        tokio::spawn(event_loop(
            Arc::clone(&self.tracker),
            issues.clone(),
            Arc::clone(teams),
            chatbus.clone(),
            Arc::clone(idle),
            filter,
            Arc::clone(factory) as Arc<dyn TeamFactory>,
            config.tracker.owner.clone(),
            config.tracker.repos.clone(),
            Duration::from_secs(config.tracker.event_poll_interval_secs),
            ctx.clone(),
        ));

        tokio::spawn(chatlog_truncator(
            chatbus.clone(),
            config.chatlog_max_lines,
            config.context_reset_interval(),
            ctx.clone(),
        ));

        tokio::spawn(branch_cleaner(
            Arc::clone(&self.vcs),
            config.clone(),
            Duration::from_secs(config.cleanup_interval_secs),
            ctx.clone(),
        ));

        tokio::spawn(main_branch_check(
            chatbus.clone(),
            Duration::from_secs(config.main_check_interval_hours * 3600),
            ctx.clone(),
        ));

        tokio::spawn(doc_check(
            chatbus.clone(),
            Duration::from_secs(config.doc_check_interval_hours * 3600),
            ctx.clone(),
        ));

        let dispatcher = Arc::new(CommandDispatcher::new(
            chatbus.clone(),
            issues.clone(),
            Arc::clone(teams),
            Arc::clone(idle),
            Arc::clone(&self.vcs),
            Arc::clone(shared_config),
        ));
        tokio::spawn(command_watcher(chatbus.clone(), dispatcher, Arc::clone(factory), ctx.clone()));
    }
}

/// Subscribes to the `orchestrator` recipient and runs every command that
/// arrives through the dispatcher until `watch` itself stops (cancellation
/// drops the `WatchHandle`, which ends its tail-follow task).
async fn command_watcher<C: Clock + 'static>(
    chatbus: ChatBus<C>,
    dispatcher: Arc<CommandDispatcher<C>>,
    factory: Arc<AgentTeamFactory<C>>,
    ctx: CancellationToken,
) {
    let handle = match chatbus.watch("orchestrator") {
        Ok(handle) => handle,
        Err(error) => {
            tracing::warn!(%error, "failed to subscribe to orchestrator commands");
            return;
        }
    };
    let factory = factory as Arc<dyn TeamFactory>;

    loop {
        tokio::select! {
            _ = ctx.cancelled() => return,
            message = handle.recv() => {
                let Some(message) = message else { return };
                let command = Command::parse(&message.body);
                if let Err(error) = dispatcher.dispatch(command, Arc::clone(&factory)).await {
                    tracing::warn!(%error, "failed to execute orchestrator command");
                }
            }
        }
    }
}

fn ensure_dir(path: &Path) -> Result<(), OrchestratorError> {
    std::fs::create_dir_all(path).map_err(|source| OrchestratorError::DataDir { path: path.to_path_buf(), source })
}

fn team_prefix() -> &'static str {
    "team-"
}

/// `supervise` takes `&dyn AgentRuntime`; this wraps an `Arc<dyn
/// AgentRuntime>` so it can be moved into a spawned task while still
/// dereferencing to a trait object reference for the duration of the call.
pub(crate) struct DynRuntimeRef(Arc<dyn AgentRuntime>);

impl DynRuntimeRef {
    pub(crate) fn new(runtime: Arc<dyn AgentRuntime>) -> Self {
        Self(runtime)
    }
}

#[async_trait::async_trait]
impl AgentRuntime for DynRuntimeRef {
    async fn spawn(&self, spec: AgentSpec) -> Result<overseer_adapters::AgentHandle, overseer_adapters::AgentRuntimeError> {
        self.0.spawn(spec).await
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
