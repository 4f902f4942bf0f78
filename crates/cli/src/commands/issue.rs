// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overseer issue` - read-only views over the locally mirrored issues.
//! The CLI never writes issue state directly; only the sync/event loops do.

use crate::exit_error::ExitError;
use crate::output::{apply_limit, format_or_json, handle_list_with_limit, OutputFormat};
use clap::{Args, Subcommand, ValueEnum};
use overseer_core::{Config, IssueFilter, IssueId, IssueStatus};
use overseer_storage::IssueStore;
use std::io::Write;

#[derive(Args)]
pub struct IssueArgs {
    #[command(subcommand)]
    pub command: IssueCommand,
}

#[derive(Subcommand)]
pub enum IssueCommand {
    /// List locally mirrored issues.
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long)]
        assigned: bool,
        #[arg(long)]
        unassigned: bool,
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        #[arg(long, conflicts_with = "limit")]
        no_limit: bool,
    },
    /// Show one issue by tracker ID.
    Show { id: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusArg {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl From<StatusArg> for IssueStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Open => IssueStatus::Open,
            StatusArg::InProgress => IssueStatus::InProgress,
            StatusArg::Resolved => IssueStatus::Resolved,
            StatusArg::Closed => IssueStatus::Closed,
        }
    }
}

pub fn issue(args: IssueArgs, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let store = IssueStore::new(config.data_dir.join("issues"));
    match args.command {
        IssueCommand::List { status, assigned, unassigned, limit, no_limit } => {
            list(&store, status, assigned, unassigned, limit, no_limit, format)
        }
        IssueCommand::Show { id } => show(&store, &id, format),
    }
}

fn list(
    store: &IssueStore,
    status: Option<StatusArg>,
    assigned_only: bool,
    unassigned_only: bool,
    limit: usize,
    no_limit: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let filter = IssueFilter { status: status.map(Into::into), assigned_only, unassigned_only };
    let mut issues = store.list(&filter)?;
    issues.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
    let truncation = apply_limit(&mut issues, limit, no_limit);

    handle_list_with_limit(format, &issues, "No issues found.", truncation, |items, out| {
        let _ = writeln!(out, "{:<8} {:<12} {:<6} {}", "ID", "STATUS", "TEAM", "TITLE");
        for issue in items {
            let team = if issue.assigned_team == 0 { "-".to_string() } else { issue.assigned_team.to_string() };
            let _ = writeln!(out, "{:<8} {:<12} {:<6} {}", issue.id.as_str(), issue.status.to_string(), team, issue.title);
        }
    })
}

fn show(store: &IssueStore, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let issue = store
        .get(&IssueId::new(id))
        .map_err(anyhow::Error::from)?
        .ok_or_else(|| ExitError::new(3, format!("no locally mirrored issue with ID {id}")))?;

    format_or_json(format, &issue, || {
        println!("Issue {}: {}", issue.id, issue.title);
        println!("Status: {}", issue.status);
        println!("Team: {}", if issue.assigned_team == 0 { "unassigned".to_string() } else { issue.assigned_team.to_string() });
        if issue.pending_approval {
            println!("Pending approval from the superintendent");
        }
        if let Some(url) = &issue.url {
            println!("URL: {url}");
        }
        if !issue.acceptance_criteria.is_empty() {
            println!("Acceptance criteria:");
            for item in &issue.acceptance_criteria {
                println!("  - {item}");
            }
        }
    })
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
