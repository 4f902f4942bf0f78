// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overseer` - operator CLI for the resident superintendent/engineer
//! system. Talks to the running daemon only through the shared chat log
//! and the filesystem; there is no control socket to connect to.

mod chat;
mod color;
mod commands;
mod daemon_process;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use commands::{daemon::DaemonArgs, issue::IssueArgs, team::TeamArgs};
use exit_error::ExitError;
use output::OutputFormat;
use overseer_core::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "overseer", version, about = "Operate the resident superintendent/engineer system", styles = color::styles())]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = "overseer.toml")]
    config: PathBuf,

    /// Output format for commands that print structured data.
    #[arg(long, value_enum, global = true, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the `overseerd` process.
    Daemon(DaemonArgs),
    /// Create or disband an engineer team.
    Team(TeamArgs),
    /// Release the idle/dormancy hold so teams resume immediately.
    Release,
    /// Ask the daemon to poll the issue tracker right away.
    Wake,
    /// Inspect locally mirrored issues.
    Issue(IssueArgs),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        if let Some(exit_error) = error.downcast_ref::<ExitError>() {
            eprintln!("{exit_error}");
            std::process::exit(exit_error.code);
        }
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let contents = std::fs::read_to_string(&cli.config).map_err(|source| {
        ExitError::new(2, format!("failed to read config file {}: {source}", cli.config.display()))
    })?;
    let config = Config::from_toml_str(&contents).map_err(|source| ExitError::new(2, source.to_string()))?;

    match cli.command {
        Command::Daemon(args) => commands::daemon::daemon(args, &cli.config, &config, cli.output).await,
        Command::Team(args) => commands::team::team(args, &config, cli.output),
        Command::Release => commands::control::release(&config),
        Command::Wake => commands::control::wake(&config),
        Command::Issue(args) => commands::issue::issue(args, &config, cli.output),
    }
}
