// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process entry point: parses flags, loads config, wires the concrete
//! adapters, and runs the orchestrator until a signal asks it to stop.

use clap::Parser;
use overseer_adapters::{ChildProcessAgentRuntime, GitVcsAdapter, HttpTrackerAdapter};
use overseer_core::{Config, SystemClock};
use overseer_daemon::Orchestrator;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "overseerd", about = "Runs the resident superintendent and engineer teams")]
struct Args {
    /// Path to the TOML config file.
    #[arg(long, default_value = "overseer.toml")]
    config: PathBuf,

    /// Name of (or path to) the LLM-driving binary each agent process runs.
    #[arg(long, default_value = "claude")]
    agent_binary: String,

    /// Base URL of the issue tracker's REST API.
    #[arg(long, default_value = "https://api.github.com")]
    tracker_base_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let contents = std::fs::read_to_string(&args.config)
        .map_err(|source| anyhow::anyhow!("failed to read config file {}: {source}", args.config.display()))?;
    let config = Config::from_toml_str(&contents)?;

    let token = std::env::var("GITHUB_TOKEN")
        .map_err(|_| anyhow::anyhow!("GITHUB_TOKEN must be set to poll the issue tracker"))?;

    let orchestrator = Orchestrator {
        clock: SystemClock,
        vcs: Arc::new(GitVcsAdapter::new()),
        tracker: Arc::new(HttpTrackerAdapter::new(args.tracker_base_url, token)?),
        runtime: Arc::new(ChildProcessAgentRuntime::new(args.agent_binary)),
        config,
        config_path: args.config.clone(),
    };

    let ctx = CancellationToken::new();
    let shutdown_ctx = ctx.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("shutdown signal received");
        shutdown_ctx.cancel();
    });

    orchestrator.run(ctx).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sig) => sig,
        Err(error) => {
            tracing::warn!(%error, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
            unreachable!()
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
