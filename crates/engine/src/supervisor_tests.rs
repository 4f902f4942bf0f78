// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use overseer_adapters::FakeAgentRuntime;
use overseer_core::{AgentId, AgentRole};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;

fn spec(id: &str) -> AgentSpec {
    AgentSpec {
        id: AgentId::new(id),
        role: AgentRole::Superintendent,
        model: "model-a".to_string(),
        cwd: PathBuf::from("/tmp"),
        system_prompt: "be helpful".to_string(),
        context_reset_interval: Duration::from_secs(7200),
    }
}

#[tokio::test(start_paused = true)]
async fn supervise_spawns_once_and_stops_on_cancellation() {
    let runtime = FakeAgentRuntime::new();
    let ctx = CancellationToken::new();
    let task_ctx = ctx.clone();
    let task_runtime = runtime.clone();
    let task = tokio::spawn(async move {
        supervise(spec("superintendent"), &task_runtime, Duration::from_millis(50), None, task_ctx).await;
    });

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(runtime.spawned().len(), 1);

    ctx.cancel();
    tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn supervise_notifies_ready_once_agent_reports_ready() {
    let runtime = FakeAgentRuntime::new();
    let ctx = CancellationToken::new();
    let ready = Arc::new(Notify::new());
    let task_ctx = ctx.clone();
    let task_runtime = runtime.clone();
    let task_ready = Arc::clone(&ready);
    let task = tokio::spawn(async move {
        supervise(spec("superintendent"), &task_runtime, Duration::from_millis(50), Some(task_ready), task_ctx).await;
    });

    tokio::time::timeout(Duration::from_secs(5), ready.notified()).await.unwrap();

    ctx.cancel();
    tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn supervise_restarts_after_process_exit_while_still_live() {
    let runtime = FakeAgentRuntime::new();
    let ctx = CancellationToken::new();
    let task_ctx = ctx.clone();
    let task_runtime = runtime.clone();

    // The fake runtime's handle wraps a real `true` child, which exits
    // immediately; supervise should back off (virtual time, advanced by
    // the paused-clock test harness) and respawn rather than returning.
    let task = tokio::spawn(async move {
        supervise(spec("engineer-1"), &task_runtime, Duration::from_millis(50), None, task_ctx).await;
    });

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(runtime.spawned().len() >= 2, "expected at least one restart after the child exited");

    ctx.cancel();
    tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}
