// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use overseer_core::{AgentId, AgentRole};
use std::path::PathBuf;
use std::time::Duration;

fn spec(id: &str) -> AgentSpec {
    AgentSpec {
        id: AgentId::new(id),
        role: AgentRole::Superintendent,
        model: "claude-opus".to_string(),
        cwd: PathBuf::from("/tmp"),
        system_prompt: String::new(),
        context_reset_interval: Duration::from_secs(60),
    }
}

#[tokio::test]
async fn child_process_runtime_spawns_and_becomes_ready() {
    let runtime = ChildProcessAgentRuntime::new("echo");
    let handle = runtime.spawn(spec("agent-1")).await.unwrap();
    let ready = handle.ready();
    tokio::time::timeout(Duration::from_secs(5), ready.notified())
        .await
        .expect("agent should become ready after emitting output");
}

#[tokio::test]
async fn child_process_runtime_reports_exit_status() {
    let runtime = ChildProcessAgentRuntime::new("true");
    let mut handle = runtime.spawn(spec("agent-2")).await.unwrap();
    let status = handle.wait().await.unwrap();
    assert!(status.success());
}

#[tokio::test]
async fn classify_exit_maps_known_codes() {
    // Use a shell to produce the exact exit codes under test.
    let mut cmd = tokio::process::Command::new("bash");
    cmd.arg("-c").arg("exit 3");
    let status = cmd.status().await.unwrap();
    assert!(matches!(classify_exit(&status), Some(overseer_core::AgentError::OutOfCredits)));
}

#[tokio::test]
async fn classify_exit_zero_is_none() {
    let mut cmd = tokio::process::Command::new("true");
    let status = cmd.status().await.unwrap();
    assert!(classify_exit(&status).is_none());
}

#[tokio::test]
async fn fake_agent_runtime_records_spawn_and_is_immediately_ready() {
    let runtime = fake::FakeAgentRuntime::new();
    let handle = runtime.spawn(spec("agent-3")).await.unwrap();

    assert_eq!(runtime.spawned().len(), 1);
    assert_eq!(runtime.spawned()[0].id, AgentId::new("agent-3"));

    tokio::time::timeout(Duration::from_millis(50), handle.ready().notified())
        .await
        .expect("fake runtime notifies readiness synchronously on spawn");
}
