// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent runtime: spawns and supervises the LLM-driving child process.
//!
//! Each agent is its own OS process with private stdin/stdout pipes. The
//! runtime fires the agent's `ready: Arc<Notify>` the moment the process
//! writes its first line of output (or an explicit handshake string),
//! mirroring the "per-process readiness signal" a Go implementation would
//! express as a closed channel. Bash tool calls the agent issues are
//! executed by the caller through [`overseer_shell::run_bash`], bounded by
//! `bash_timeout_minutes`; this module only owns the process lifecycle.

use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use overseer_core::{Agent, AgentError, AgentSpec};
use std::process::ExitStatus;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Notify;

#[derive(Debug, Error)]
pub enum AgentRuntimeError {
    #[error("failed to spawn agent process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("agent process error: {0}")]
    Io(#[source] std::io::Error),
}

/// A live agent process plus its readiness signal. The caller that spawned
/// it holds the only `AgentHandle` — it is moved, not cloned, into the
/// supervisor task that owns it for its whole lifetime.
pub struct AgentHandle {
    agent: Agent,
    child: Child,
}

impl AgentHandle {
    pub fn ready(&self) -> Arc<Notify> {
        Arc::clone(&self.agent.ready)
    }

    pub fn agent_id(&self) -> &overseer_core::AgentId {
        &self.agent.spec.id
    }

    /// Wait for the process to exit. Callers that also need to race this
    /// against a `CancellationToken` (the supervisor loop does, per its
    /// own cancel-then-kill contract) select on this future directly
    /// rather than have cancellation plumbed through here, so a single
    /// exited-vs-cancelled race lives in one place.
    pub async fn wait(&mut self) -> Result<ExitStatus, AgentRuntimeError> {
        self.child.wait().await.map_err(AgentRuntimeError::Io)
    }

    /// Send a cooperative SIGTERM without waiting for the process to exit.
    /// The caller races `wait()` against a grace deadline and escalates to
    /// [`Self::kill`] if the process is still alive when it elapses.
    pub fn terminate(&self) {
        let Some(pid) = self.child.id() else { return };
        if let Err(error) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            tracing::warn!(agent_id = %self.agent.spec.id, %error, "failed to send SIGTERM to agent process");
        }
    }

    /// Hard kill (SIGKILL) and reap the process.
    pub async fn kill(&mut self) {
        let _ = self.child.start_kill();
        let _ = self.child.wait().await;
    }
}

#[async_trait]
pub trait AgentRuntime: Send + Sync + 'static {
    async fn spawn(&self, spec: AgentSpec) -> Result<AgentHandle, AgentRuntimeError>;
}

/// Spawns the configured agent binary as a child process.
#[derive(Clone)]
pub struct ChildProcessAgentRuntime {
    /// Path to (or name of) the LLM-driving binary, e.g. `claude`.
    binary: String,
}

impl ChildProcessAgentRuntime {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

#[async_trait]
impl AgentRuntime for ChildProcessAgentRuntime {
    async fn spawn(&self, spec: AgentSpec) -> Result<AgentHandle, AgentRuntimeError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--model")
            .arg(&spec.model)
            .current_dir(&spec.cwd)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        let mut child = cmd.spawn().map_err(AgentRuntimeError::Spawn)?;
        let agent = Agent::new(spec);

        if let Some(stdout) = child.stdout.take() {
            let ready = Arc::clone(&agent.ready);
            let agent_id = agent.spec.id.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                match lines.next_line().await {
                    Ok(Some(_first_line)) => {
                        tracing::info!(%agent_id, "agent process emitted first output line, marking ready");
                        ready.notify_one();
                    }
                    Ok(None) => {
                        tracing::warn!(%agent_id, "agent process closed stdout before producing output");
                    }
                    Err(e) => {
                        tracing::warn!(%agent_id, error = %e, "failed reading agent stdout");
                    }
                }
            });
        }

        Ok(AgentHandle { agent, child })
    }
}

/// Maps a raw exit status into a categorized [`AgentError`] the
/// supervisor can act on (rate limits, auth failures, etc. warrant
/// different backoff/alerting than a plain crash).
pub fn classify_exit(status: &ExitStatus) -> Option<AgentError> {
    match status.code() {
        Some(0) => None,
        Some(2) => Some(AgentError::Unauthorized),
        Some(3) => Some(AgentError::OutOfCredits),
        Some(4) => Some(AgentError::NoInternet),
        Some(5) => Some(AgentError::RateLimited),
        Some(code) => Some(AgentError::Other(format!("exited with status {code}"))),
        None => Some(AgentError::Other("terminated by signal".to_string())),
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::{AgentRuntime, AgentRuntimeError};
    use async_trait::async_trait;
    use overseer_core::{Agent, AgentSpec};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records every spawn and fires readiness immediately; never spawns a
    /// real process. Follows the [`crate::vcs::fake::FakeVcsAdapter`] pattern.
    #[derive(Clone, Default)]
    pub struct FakeAgentRuntime {
        spawned: Arc<Mutex<Vec<AgentSpec>>>,
    }

    impl FakeAgentRuntime {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn spawned(&self) -> Vec<AgentSpec> {
            self.spawned.lock().clone()
        }
    }

    #[async_trait]
    impl AgentRuntime for FakeAgentRuntime {
        async fn spawn(&self, spec: AgentSpec) -> Result<super::AgentHandle, AgentRuntimeError> {
            self.spawned.lock().push(spec.clone());
            let agent = Agent::new(spec);
            agent.ready.notify_one();
            // A fake handle has no real child process; the engine's
            // test doubles poll `ready`/call into the fake runtime
            // directly rather than waiting on a process exit.
            Ok(super::AgentHandle {
                agent,
                child: fake_noop_child(),
            })
        }
    }

    fn fake_noop_child() -> tokio::process::Child {
        tokio::process::Command::new("true")
            .spawn()
            .expect("spawning `true` for a fake agent handle")
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAgentRuntime;

#[cfg(test)]
#[path = "agent_runtime_tests.rs"]
mod tests;
