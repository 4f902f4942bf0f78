// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with timeouts.
//!
//! Every agent-issued bash command and every `git` invocation made by the
//! VCS adapter goes through [`run_with_timeout`]: a bounded wait around
//! `Command::output()` that converts both an I/O error and an elapsed
//! deadline into a single error type, and relies on tokio's `Child` drop
//! implementation to kill the process when the deadline passes.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Default timeout for `git` plumbing commands issued by the VCS adapter.
pub const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{description} failed: {source}")]
    Io {
        description: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{description} timed out after {timeout_secs}s")]
    TimedOut { description: String, timeout_secs: u64 },
}

/// Run `cmd`, killing it if it has not exited within `timeout`.
///
/// A non-zero exit status is not itself an error — callers inspect
/// `Output::status` the same way they would with a direct `Command::output()`
/// call. Only a failure to spawn/wait, or the timeout itself, is an `Err`.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, ShellError> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ShellError::Io {
            description: description.to_string(),
            source,
        }),
        Err(_elapsed) => Err(ShellError::TimedOut {
            description: description.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// Output of a bash invocation, with stdout/stderr decoded lossily for
/// forwarding into the chat log.
#[derive(Debug, Clone)]
pub struct BashOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl BashOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run `command` as `bash -c <command>` in `cwd`, bounded by `timeout`
/// (the agent runtime's `bash_timeout_minutes` setting).
pub async fn run_bash(command: &str, cwd: &std::path::Path, timeout: Duration) -> Result<BashOutput, ShellError> {
    let mut cmd = Command::new("bash");
    cmd.arg("-c").arg(command).current_dir(cwd);
    let output = run_with_timeout(cmd, timeout, "bash command").await?;
    Ok(BashOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
