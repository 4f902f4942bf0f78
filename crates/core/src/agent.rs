// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identity and the supervised-process record.
//!
//! An `Agent` is a resident superintendent or a team's engineer: a
//! supervised child process driving an LLM with a role-specific system
//! prompt. The `AgentId` is opaque to everything outside the adapter that
//! spawned the process.

use crate::team::TeamId;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Unique identifier for an agent instance. Opaque to consumers; the
/// concrete process/session identity lives inside the agent runtime adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for AgentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The role an agent plays, determining its chat-log recipient name and
/// which commands it is authorized to issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentRole {
    /// The single resident planning agent; the authorized author of
    /// `TEAM_CREATE`/`TEAM_DISBAND`/`RELEASE`/`WAKE_GITHUB`.
    Superintendent,
    /// A team's engineer, scoped to one bound issue and worktree.
    Engineer(TeamId),
}

impl AgentRole {
    /// The chat-log recipient name this role listens on.
    pub fn recipient(&self) -> String {
        match self {
            AgentRole::Superintendent => "superintendent".to_string(),
            AgentRole::Engineer(team_id) => format!("engineer-{team_id}"),
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.recipient())
    }
}

/// Static configuration for an agent process, used by the supervisor to
/// (re)spawn it.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub id: AgentId,
    pub role: AgentRole,
    pub model: String,
    pub cwd: PathBuf,
    pub system_prompt: String,
    pub context_reset_interval: Duration,
}

/// A resident agent: the spec it was spawned from, plus the readiness
/// signal the supervisor awaits before the agent is considered live. This
/// is the Rust analogue of a Go "ready channel" closed once by the
/// spawning side and awaited any number of times by others.
#[derive(Debug, Clone)]
pub struct Agent {
    pub spec: AgentSpec,
    pub ready: Arc<Notify>,
}

impl Agent {
    pub fn new(spec: AgentSpec) -> Self {
        Self {
            spec,
            ready: Arc::new(Notify::new()),
        }
    }
}

/// Categorized failure reasons for an agent process, mirrored from adapter
/// errors so the supervisor can log without depending on adapter crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentError {
    Unauthorized,
    OutOfCredits,
    NoInternet,
    RateLimited,
    Other(String),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::Unauthorized => write!(f, "unauthorized"),
            AgentError::OutOfCredits => write!(f, "out of credits"),
            AgentError::NoInternet => write!(f, "no internet connection"),
            AgentError::RateLimited => write!(f, "rate limited"),
            AgentError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
