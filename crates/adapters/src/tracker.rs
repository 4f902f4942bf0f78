// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream issue tracker client.
//!
//! Polling-based: the tracker has no push mechanism we can rely on from a
//! long-lived daemon, so both the open-issue list and the event stream are
//! fetched over plain HTTP on a timer by the caller (`engine::pollers`).
//! This module only owns the wire client and response decoding.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("tracker returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode tracker response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// An issue as reported by the upstream tracker, prior to reconciliation
/// into the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIssue {
    pub id: String,
    pub title: String,
    pub body: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEventKind {
    Issues,
    PullRequest,
    IssueComment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerEvent {
    pub kind: TrackerEventKind,
    pub issue_id: String,
    pub comment: Option<Comment>,
}

#[async_trait]
pub trait IssueTrackerAdapter: Send + Sync + 'static {
    async fn list_open_issues(&self, owner: &str, repos: &[String]) -> Result<Vec<RemoteIssue>, TrackerError>;
    async fn stream_events(&self, owner: &str, repos: &[String]) -> Result<Vec<TrackerEvent>, TrackerError>;
}

/// Polling HTTP client for a GitHub-shaped issue tracker API.
#[derive(Clone)]
pub struct HttpTrackerAdapter {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpTrackerAdapter {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, TrackerError> {
        let client = reqwest::ClientBuilder::new()
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url: base_url.into(), token: token.into() })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, TrackerError> {
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(TrackerError::Status { status: status.as_u16(), body: text });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    issue_number: u64,
    #[serde(default)]
    comment_id: Option<u64>,
    #[serde(default)]
    comment_author: Option<String>,
    #[serde(default)]
    comment_body: Option<String>,
}

#[async_trait]
impl IssueTrackerAdapter for HttpTrackerAdapter {
    async fn list_open_issues(&self, owner: &str, repos: &[String]) -> Result<Vec<RemoteIssue>, TrackerError> {
        let mut issues = Vec::new();
        for repo in repos {
            let raw: Vec<RawIssue> = self.get_json(&format!("/repos/{owner}/{repo}/issues?state=open")).await?;
            issues.extend(raw.into_iter().filter(|i| i.pull_request.is_none()).map(|i| RemoteIssue {
                id: i.number.to_string(),
                title: i.title,
                body: i.body.unwrap_or_default(),
                url: i.html_url,
            }));
        }
        Ok(issues)
    }

    async fn stream_events(&self, owner: &str, repos: &[String]) -> Result<Vec<TrackerEvent>, TrackerError> {
        let mut events = Vec::new();
        for repo in repos {
            let raw: Vec<RawEvent> = self.get_json(&format!("/repos/{owner}/{repo}/events")).await?;
            for e in raw {
                let kind = match e.kind.as_str() {
                    "IssuesEvent" => TrackerEventKind::Issues,
                    "PullRequestEvent" => TrackerEventKind::PullRequest,
                    "IssueCommentEvent" => TrackerEventKind::IssueComment,
                    _ => continue,
                };
                let comment = e.comment_id.map(|id| Comment {
                    id: id.to_string(),
                    author: e.comment_author.unwrap_or_default(),
                    body: e.comment_body.unwrap_or_default(),
                });
                events.push(TrackerEvent { kind, issue_id: e.issue_number.to_string(), comment });
            }
        }
        Ok(events)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::{IssueTrackerAdapter, RemoteIssue, TrackerError, TrackerEvent};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeTrackerAdapter {
        issues: Arc<Mutex<Vec<RemoteIssue>>>,
        events: Arc<Mutex<Vec<TrackerEvent>>>,
    }

    impl FakeTrackerAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_open_issues(&self, issues: Vec<RemoteIssue>) {
            *self.issues.lock() = issues;
        }

        /// Queue events for the next `stream_events` call, which drains them.
        pub fn push_events(&self, events: Vec<TrackerEvent>) {
            self.events.lock().extend(events);
        }
    }

    #[async_trait]
    impl IssueTrackerAdapter for FakeTrackerAdapter {
        async fn list_open_issues(&self, _owner: &str, _repos: &[String]) -> Result<Vec<RemoteIssue>, TrackerError> {
            Ok(self.issues.lock().clone())
        }

        async fn stream_events(&self, _owner: &str, _repos: &[String]) -> Result<Vec<TrackerEvent>, TrackerError> {
            Ok(std::mem::take(&mut *self.events.lock()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTrackerAdapter;

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
