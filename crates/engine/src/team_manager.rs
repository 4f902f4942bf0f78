// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded pool of teams, race-free reservation, and the issue-id reverse
//! index. Termination of a disbanded team's agent process and worktree is
//! the caller's job (the dispatcher, which holds the per-team supervisor
//! handles) — [`TeamManager`] only owns the registry, matching the
//! no-aliasing rule that a running agent process has exactly one owner.

use async_trait::async_trait;
use overseer_core::{Team, TeamError, TeamId};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Produces a live team (engineer agent + worktree) for a reserved slot.
/// Implemented by the engine layer that actually spawns processes and
/// creates worktrees; kept behind a trait so `TeamManager` itself has no
/// adapter dependencies.
#[async_trait]
pub trait TeamFactory: Send + Sync {
    async fn build(&self, team_id: TeamId, issue_id: &str) -> Result<Team, TeamError>;

    /// Stop `team`'s agent process and remove its worktree. Called after
    /// the team manager has already removed the registry entry; a no-op
    /// default suits factories with nothing to tear down (tests, standby
    /// teams with no process yet).
    async fn teardown(&self, _team: &Team) {}
}

pub struct TeamManager {
    max_teams: u32,
    teams: Mutex<HashMap<TeamId, Team>>,
    by_issue: Mutex<HashMap<String, TeamId>>,
    /// Reserved-but-not-yet-live slots: team id -> issue id (possibly empty
    /// for a standby team created at boot).
    pending: Mutex<HashMap<TeamId, String>>,
}

impl TeamManager {
    pub fn new(max_teams: u32) -> Self {
        Self {
            max_teams,
            teams: Mutex::new(HashMap::new()),
            by_issue: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn has_issue(&self, issue_id: &str) -> bool {
        if issue_id.is_empty() {
            return false;
        }
        self.by_issue.lock().contains_key(issue_id) || self.pending.lock().values().any(|v| v == issue_id)
    }

    pub fn count(&self) -> usize {
        self.teams.lock().len()
    }

    /// Reserve a slot for `issue_id`, invoke `factory` to build the team,
    /// and install it on success. The reservation (slot id + pending
    /// insert) happens atomically under the team/pending locks before the
    /// (potentially minutes-long) factory call runs.
    pub async fn create(&self, issue_id: impl Into<String>, factory: &dyn TeamFactory) -> Result<TeamId, TeamError> {
        let issue_id = issue_id.into();
        let team_id = self.reserve(&issue_id)?;

        match factory.build(team_id, &issue_id).await {
            Ok(team) => {
                self.teams.lock().insert(team_id, team);
                if !issue_id.is_empty() {
                    self.by_issue.lock().insert(issue_id, team_id);
                }
                self.pending.lock().remove(&team_id);
                Ok(team_id)
            }
            Err(error) => {
                self.pending.lock().remove(&team_id);
                Err(error)
            }
        }
    }

    fn reserve(&self, issue_id: &str) -> Result<TeamId, TeamError> {
        let teams = self.teams.lock();
        let mut pending = self.pending.lock();

        if !issue_id.is_empty() {
            let duplicate =
                self.by_issue.lock().contains_key(issue_id) || pending.values().any(|v| v == issue_id);
            if duplicate {
                return Err(TeamError::Duplicate(issue_id.to_string()));
            }
        }

        if (teams.len() + pending.len()) as u32 >= self.max_teams {
            return Err(TeamError::Full { max_teams: self.max_teams });
        }

        let team_id = (1..=self.max_teams)
            .map(TeamId::new)
            .find(|id| !teams.contains_key(id) && !pending.contains_key(id))
            .ok_or(TeamError::Full { max_teams: self.max_teams })?;

        pending.insert(team_id, issue_id.to_string());
        Ok(team_id)
    }

    /// Remove and return the team bound to `issue_id`. Termination of its
    /// agent and worktree removal are the caller's responsibility.
    pub fn disband_by_issue(&self, issue_id: &str) -> Result<Team, TeamError> {
        let team_id = self
            .by_issue
            .lock()
            .remove(issue_id)
            .ok_or_else(|| TeamError::NotFound(issue_id.to_string()))?;
        self.teams
            .lock()
            .remove(&team_id)
            .ok_or_else(|| TeamError::NotFound(issue_id.to_string()))
    }
}

#[cfg(test)]
#[path = "team_manager_tests.rs"]
mod tests;
