// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team entity.
//!
//! A team is a numbered holder of at most one bound issue and exactly one
//! engineer agent, plus its private source-tree worktree. Grounded on the
//! `Crew` entity this codebase used for standalone agent invocations, but
//! simplified to the state spec.md actually describes: a team is either
//! standby (`issue_id` empty) or bound to exactly one issue.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A team's numeric identity, in `[1, max_teams]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u32);

impl TeamId {
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A team instance: an engineer agent plus its dedicated worktree, bound
/// to at most one issue at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    /// Bound issue ID, empty when standby.
    pub issue_id: String,
    pub engineer: AgentId,
    pub worktree_path: PathBuf,
    pub created_at_ms: u64,
}

impl Team {
    /// A team with no bound issue is available for reassignment.
    pub fn is_standby(&self) -> bool {
        self.issue_id.is_empty()
    }
}

crate::builder! {
    pub struct TeamBuilder => Team {
        into {
            issue_id: String = "",
            worktree_path: PathBuf = "/tmp/team-1",
        }
        set {
            id: TeamId = TeamId::new(1),
            engineer: AgentId = AgentId::new("agent-1"),
            created_at_ms: u64 = 0,
        }
    }
}

/// Errors from team-manager operations (§4.2).
#[derive(Debug, Error)]
pub enum TeamError {
    /// Live + pending team count is already at `max_teams`.
    #[error("team pool is full ({max_teams} teams)")]
    Full { max_teams: u32 },
    /// `issue_id` is already live or pending in another team.
    #[error("issue {0} is already assigned to a team")]
    Duplicate(String),
    /// No team is bound to the given issue.
    #[error("no team bound to issue {0}")]
    NotFound(String),
    /// The team factory (agent runtime + worktree creation) failed.
    #[error("team factory failed: {0}")]
    Factory(String),
}

/// Tag-only variant of [`TeamError`], useful for callers that branch on
/// kind without matching the full error (e.g. pre-validation in the
/// command dispatcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamErrorKind {
    Full,
    Duplicate,
    NotFound,
    Factory,
}

impl TeamError {
    pub fn kind(&self) -> TeamErrorKind {
        match self {
            TeamError::Full { .. } => TeamErrorKind::Full,
            TeamError::Duplicate(_) => TeamErrorKind::Duplicate,
            TeamError::NotFound(_) => TeamErrorKind::NotFound,
            TeamError::Factory(_) => TeamErrorKind::Factory,
        }
    }
}

#[cfg(test)]
#[path = "team_tests.rs"]
mod tests;
