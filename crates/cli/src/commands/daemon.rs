// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overseer daemon` - start, stop, and inspect the resident `overseerd`
//! process via its PID file and log file.

use crate::daemon_process::{self, StopOutcome};
use crate::output::{display_log, format_or_json, format_time_ago, OutputFormat};
use clap::{Args, Subcommand};
use overseer_core::Config;
use std::path::Path;

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon.
    Start {
        /// Run in the foreground instead of detaching.
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon (SIGTERM, escalating to SIGKILL after the grace period).
    Stop,
    /// Report whether the daemon is running.
    Status,
    /// View the daemon's log file.
    Logs {
        #[arg(short = 'n', long, default_value = "200")]
        limit: usize,
        #[arg(long, conflicts_with = "limit")]
        no_limit: bool,
        #[arg(long, short)]
        follow: bool,
    },
}

pub async fn daemon(args: DaemonArgs, config_path: &Path, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        DaemonCommand::Start { foreground } => start(config_path, config, foreground).await,
        DaemonCommand::Stop => stop(config),
        DaemonCommand::Status => status(config, format),
        DaemonCommand::Logs { limit, no_limit, follow } => logs(config, limit, no_limit, follow, format).await,
    }
}

async fn start(config_path: &Path, config: &Config, foreground: bool) -> anyhow::Result<()> {
    if foreground {
        let status = std::process::Command::new(daemon_process::find_daemon_binary())
            .arg("--config")
            .arg(config_path)
            .status()?;
        if !status.success() {
            anyhow::bail!("daemon exited with status: {status}");
        }
        return Ok(());
    }

    if let Some(pid) = daemon_process::read_pid(&config.data_dir) {
        if daemon_process::process_exists(pid) {
            println!("Daemon already running (pid {pid})");
            return Ok(());
        }
    }

    std::fs::create_dir_all(&config.data_dir)?;
    let pid = daemon_process::spawn_background(config_path, &config.data_dir)?;
    println!("Daemon started (pid {pid})");
    Ok(())
}

fn stop(config: &Config) -> anyhow::Result<()> {
    match daemon_process::stop(&config.data_dir, config.agent_kill_grace()) {
        StopOutcome::NotRunning => println!("Daemon not running"),
        StopOutcome::Stopped => println!("Daemon stopped"),
        StopOutcome::Killed => println!("Daemon did not stop gracefully, killed"),
    }
    Ok(())
}

fn status(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let pid = daemon_process::read_pid(&config.data_dir).filter(|pid| daemon_process::process_exists(*pid));
    let Some(pid) = pid else {
        let obj = serde_json::json!({ "status": "not_running" });
        return format_or_json(format, &obj, || println!("Status: not running"));
    };

    let started_at_ms = daemon_process::pid_file_path(&config.data_dir)
        .metadata()
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let obj = serde_json::json!({
        "status": "running",
        "pid": pid,
        "uptime": format_time_ago(started_at_ms),
    });
    format_or_json(format, &obj, || {
        println!("Status: running");
        println!("PID: {pid}");
        println!("Uptime: {}", format_time_ago(started_at_ms));
    })
}

async fn logs(config: &Config, limit: usize, no_limit: bool, follow: bool, format: OutputFormat) -> anyhow::Result<()> {
    let log_path = daemon_process::log_file_path(&config.data_dir);
    if !log_path.exists() {
        return display_log(&log_path, "", follow, format).await;
    }

    let content = if no_limit {
        std::fs::read_to_string(&log_path)?
    } else {
        read_last_lines(&log_path, limit)?
    };
    display_log(&log_path, &content, follow, format).await
}

fn read_last_lines(path: &Path, limit: usize) -> std::io::Result<String> {
    let content = std::fs::read_to_string(path)?;
    let total = content.lines().count();
    let skip = total.saturating_sub(limit);
    Ok(content.lines().skip(skip).collect::<Vec<_>>().join("\n") + "\n")
}
