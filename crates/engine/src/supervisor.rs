// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One supervisor task owns exactly one [`AgentHandle`] for its whole
//! lifetime: spawn, restart-on-crash while live, cooperative-stop then
//! hard-kill on cancellation. No `Arc` around the handle — ownership never
//! needs to be shared, matching §5's "no aliasing" rule for child
//! processes.

use overseer_adapters::{AgentRuntime, AgentRuntimeError, classify_exit};
use overseer_core::AgentSpec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

const RESTART_BACKOFF: Duration = Duration::from_secs(5);

/// Runs `spec` under `runtime` until `ctx` is cancelled. Exits while `ctx`
/// is still live are logged and retried after [`RESTART_BACKOFF`]; a
/// cancellation in flight sends a cooperative stop and hard-kills after
/// `kill_grace` if the process hasn't exited by then.
///
/// `ready`, if given, is notified once per spawn attempt's readiness
/// signal (the process's first line of output). The orchestrator's
/// startup barrier awaits it once on a resident agent's first spawn;
/// later notifications from a restart are harmless extra permits.
pub async fn supervise(
    spec: AgentSpec,
    runtime: &dyn AgentRuntime,
    kill_grace: Duration,
    ready: Option<Arc<Notify>>,
    ctx: CancellationToken,
) {
    loop {
        let mut handle = match runtime.spawn(spec.clone()).await {
            Ok(handle) => handle,
            Err(error) => {
                tracing::warn!(agent_id = %spec.id, %error, "failed to spawn agent, retrying after backoff");
                if wait_or_cancelled(RESTART_BACKOFF, &ctx).await {
                    return;
                }
                continue;
            }
        };

        if let Some(ready) = ready.clone() {
            let handle_ready = handle.ready();
            tokio::spawn(async move {
                handle_ready.notified().await;
                ready.notify_waiters();
            });
        }

        tokio::select! {
            exit = handle.wait() => {
                report_exit(&spec, exit);
                if ctx.is_cancelled() {
                    return;
                }
                if wait_or_cancelled(RESTART_BACKOFF, &ctx).await {
                    return;
                }
            }
            _ = ctx.cancelled() => {
                stop_with_grace(&mut handle, kill_grace).await;
                return;
            }
        }
    }
}

fn report_exit(spec: &AgentSpec, exit: Result<std::process::ExitStatus, AgentRuntimeError>) {
    match exit {
        Ok(status) => match classify_exit(&status) {
            Some(error) => tracing::warn!(agent_id = %spec.id, %error, "agent process exited with an error"),
            None => tracing::info!(agent_id = %spec.id, "agent process exited cleanly"),
        },
        Err(error) => tracing::warn!(agent_id = %spec.id, %error, "failed waiting on agent process"),
    }
}

async fn stop_with_grace(handle: &mut overseer_adapters::AgentHandle, kill_grace: Duration) {
    handle.terminate();
    tokio::select! {
        _ = handle.wait() => {}
        _ = tokio::time::sleep(kill_grace) => {
            tracing::warn!(agent_id = %handle.agent_id(), "agent did not exit within grace period, killing");
            handle.kill().await;
        }
    }
}

/// Sleeps for `duration` unless `ctx` is cancelled first. Returns `true`
/// if cancellation won the race.
async fn wait_or_cancelled(duration: Duration, ctx: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = ctx.cancelled() => true,
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
