// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::process::Command;

#[tokio::test]
async fn run_with_timeout_success() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo").await.unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn run_with_timeout_nonzero_exit_is_not_an_error() {
    let cmd = Command::new("false");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "false").await.unwrap();
    assert!(!output.status.success());
}

#[tokio::test]
async fn run_with_timeout_io_error() {
    let cmd = Command::new("/nonexistent/binary");
    let result = run_with_timeout(cmd, Duration::from_secs(5), "nonexistent").await;
    assert!(matches!(result, Err(ShellError::Io { .. })));
}

#[tokio::test]
async fn run_with_timeout_timeout_elapsed() {
    let mut cmd = Command::new("sleep");
    cmd.arg("10");
    let result = run_with_timeout(cmd, Duration::from_millis(100), "test sleep").await;
    match result {
        Err(ShellError::TimedOut { description, .. }) => assert_eq!(description, "test sleep"),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn run_bash_captures_stdout_and_exit_code() {
    let output = run_bash("echo hi; exit 3", std::path::Path::new("/tmp"), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(output.stdout.trim(), "hi");
    assert_eq!(output.exit_code, 3);
    assert!(!output.success());
}

#[tokio::test]
async fn run_bash_runs_in_given_cwd() {
    let dir = std::env::temp_dir();
    let output = run_bash("pwd", &dir, Duration::from_secs(5)).await.unwrap();
    assert_eq!(output.stdout.trim(), dir.to_string_lossy().trim_end_matches('/'));
}
