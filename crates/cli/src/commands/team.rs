// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overseer team` - ask the resident superintendent to create or disband
//! an engineer team for an issue, or list which issues currently have one.
//! The daemon's live `TeamManager` is in-process state the CLI can't reach
//! directly, so `list` is derived from the locally mirrored issue store.

use crate::chat::send_command;
use crate::output::{handle_list, OutputFormat};
use clap::{Args, Subcommand};
use overseer_core::{Config, IssueFilter};
use overseer_storage::IssueStore;
use std::io::Write;

#[derive(Args)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand)]
pub enum TeamCommand {
    /// Start an engineer team on the given issue.
    Create {
        issue_id: String,
    },
    /// Tear down the team assigned to the given issue.
    Disband {
        issue_id: String,
    },
    /// List issues that currently have a team assigned.
    List,
}

pub fn team(args: TeamArgs, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        TeamCommand::Create { issue_id } => {
            send_command(config, &format!("TEAM_CREATE {issue_id}"))?;
            println!("Requested team for issue {issue_id}");
            Ok(())
        }
        TeamCommand::Disband { issue_id } => {
            send_command(config, &format!("TEAM_DISBAND {issue_id}"))?;
            println!("Requested disband of the team on issue {issue_id}");
            Ok(())
        }
        TeamCommand::List => list(config, format),
    }
}

fn list(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let store = IssueStore::new(config.data_dir.join("issues"));
    let filter = IssueFilter { status: None, assigned_only: true, unassigned_only: false };
    let mut issues = store.list(&filter)?;
    issues.sort_by_key(|issue| issue.assigned_team);

    handle_list(format, &issues, "No teams assigned.", |items, out| {
        let _ = writeln!(out, "{:<6} {:<8} {}", "TEAM", "ISSUE", "TITLE");
        for issue in items {
            let _ = writeln!(out, "{:<6} {:<8} {}", issue.assigned_team, issue.id.as_str(), issue.title);
        }
    })
}
