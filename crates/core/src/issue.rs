// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Issue entity.
//!
//! Issues are synced from the upstream tracker and mirrored locally as
//! files (see the storage crate). `IssueId` is the tracker's own opaque
//! identifier (e.g. `"123"` for a GitHub issue number), not a generated ID,
//! so it is a plain string newtype rather than a `define_id!` type.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IssueId(pub String);

impl IssueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IssueId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Upstream tracker status, as last observed by the sync loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

crate::simple_display! {
    IssueStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

/// A tracker issue mirrored into local storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub body: String,
    pub acceptance_criteria: Vec<String>,
    pub url: Option<String>,
    pub status: IssueStatus,
    /// `0` when unassigned.
    pub assigned_team: u32,
    /// Set when an engineer has opened a PR/review request awaiting the
    /// superintendent's sign-off; blocks the sync loop from reassigning.
    pub pending_approval: bool,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Issue {
    /// An issue is claimable by `TEAM_CREATE` when it is open or
    /// in-progress, unassigned, and not awaiting approval.
    pub fn is_claimable(&self) -> bool {
        matches!(self.status, IssueStatus::Open | IssueStatus::InProgress)
            && self.assigned_team == 0
            && !self.pending_approval
    }
}

crate::builder! {
    pub struct IssueBuilder => Issue {
        into {
            id: IssueId = "issue-1",
            title: String = "untitled",
            body: String = "",
        }
        set {
            acceptance_criteria: Vec<String> = Vec::new(),
            url: Option<String> = None,
            status: IssueStatus = IssueStatus::Open,
            assigned_team: u32 = 0,
            pending_approval: bool = false,
            created_at_ms: u64 = 0,
            updated_at_ms: u64 = 0,
        }
    }
}

/// Predicate used by the sync/event loops and the `issue list` CLI command
/// to select a subset of locally mirrored issues.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub status: Option<IssueStatus>,
    pub assigned_only: bool,
    pub unassigned_only: bool,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(status) = self.status {
            if issue.status != status {
                return false;
            }
        }
        if self.assigned_only && issue.assigned_team == 0 {
            return false;
        }
        if self.unassigned_only && issue.assigned_team != 0 {
            return false;
        }
        true
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
