// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream sync and event pollers (the only two tasks that talk to the
//! issue tracker over the network).
//!
//! Idle mode stretches both loops' interval to `IDLE_INTERVAL_MULTIPLIER`
//! times their normal cadence rather than a separately configured value —
//! the tracker config only carries one interval per loop, and scaling it
//! keeps the idle/normal relationship proportional regardless of how the
//! operator has tuned polling for their rate limits.

use crate::idle_controller::IdleController;
use crate::team_manager::TeamFactory;
use overseer_adapters::{IssueTrackerAdapter, TrackerEventKind};
use overseer_core::{Clock, Issue, IssueId, IssueStatus};
use overseer_storage::{IssueStore, IssueStoreError};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const IDLE_INTERVAL_MULTIPLIER: u32 = 5;
const SEEN_COMMENTS_CAP: usize = 2048;

pub async fn sync_loop<C: Clock>(
    tracker: Arc<dyn IssueTrackerAdapter>,
    store: IssueStore,
    idle: Arc<IdleController<C>>,
    owner: String,
    repos: Vec<String>,
    normal_interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            return;
        }
        if !idle.is_dormant() {
            match tracker.list_open_issues(&owner, &repos).await {
                Ok(remote_issues) => {
                    let open_count = remote_issues.len();
                    if let Err(error) = reconcile(&store, remote_issues) {
                        tracing::warn!(%error, "failed to reconcile synced issues into the store");
                    }
                    idle.set_has_issues(open_count > 0);
                }
                Err(error) => tracing::warn!(%error, "issue tracker sync failed"),
            }
        }

        let delay = idle.adapt_interval(normal_interval, normal_interval * IDLE_INTERVAL_MULTIPLIER);
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

fn reconcile(store: &IssueStore, remote_issues: Vec<overseer_adapters::RemoteIssue>) -> Result<(), IssueStoreError> {
    for remote in remote_issues {
        let id = IssueId::new(remote.id);
        match store.get(&id)? {
            Some(mut existing) => {
                existing.title = remote.title;
                existing.body = remote.body;
                existing.url = Some(remote.url);
                store.put(&existing)?;
            }
            None => {
                let issue = Issue::builder()
                    .id(id)
                    .title(remote.title)
                    .body(remote.body)
                    .url(Some(remote.url))
                    .status(IssueStatus::Open)
                    .build();
                store.put(&issue)?;
            }
        }
    }
    Ok(())
}

/// Filters which upstream comments reach the chat log (§4.6 i-iv). Pure
/// and clock-free so it can be unit-tested directly.
pub struct CommentFilter {
    allowed_authors: Vec<String>,
    bot_patterns: Vec<Regex>,
}

impl CommentFilter {
    pub fn new(allowed_authors: Vec<String>, bot_detection_patterns: &[String]) -> Self {
        let bot_patterns = bot_detection_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(error) => {
                    tracing::warn!(%pattern, %error, "ignoring invalid bot_detection_patterns entry");
                    None
                }
            })
            .collect();
        Self { allowed_authors, bot_patterns }
    }

    /// Whether a comment by `author` on an issue with `issue_status` should
    /// be forwarded into the chat log.
    pub fn passes(&self, author: &str, body: &str, issue_status: IssueStatus) -> bool {
        if matches!(issue_status, IssueStatus::Closed | IssueStatus::Resolved) {
            return false;
        }
        if self.allowed_authors.iter().any(|a| a == author) {
            return true;
        }
        if is_bot_login(author) {
            return false;
        }
        !self.bot_patterns.iter().any(|re| re.is_match(body))
    }
}

fn is_bot_login(author: &str) -> bool {
    author.ends_with("[bot]") || author.eq_ignore_ascii_case("dependabot") || author.eq_ignore_ascii_case("github-actions")
}

/// Bounded de-duplication of `(issue_id, comment_id)` pairs: a `VecDeque`
/// insertion order plus membership checks via linear scan, cleared down
/// to half capacity once it hits [`SEEN_COMMENTS_CAP`]. Simpler than an
/// LRU crate dependency for a cache this small and this rarely hit.
struct SeenComments {
    order: VecDeque<(String, String)>,
}

impl SeenComments {
    fn new() -> Self {
        Self { order: VecDeque::new() }
    }

    fn insert_if_new(&mut self, issue_id: &str, comment_id: &str) -> bool {
        let key = (issue_id.to_string(), comment_id.to_string());
        if self.order.contains(&key) {
            return false;
        }
        if self.order.len() >= SEEN_COMMENTS_CAP {
            let keep_from = self.order.len() / 2;
            self.order.drain(0..keep_from);
        }
        self.order.push_back(key);
        true
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn event_loop<C: Clock>(
    tracker: Arc<dyn IssueTrackerAdapter>,
    store: IssueStore,
    teams: Arc<crate::team_manager::TeamManager>,
    chatbus: crate::chatbus::ChatBus<C>,
    idle: Arc<IdleController<C>>,
    filter: CommentFilter,
    factory: Arc<dyn TeamFactory>,
    owner: String,
    repos: Vec<String>,
    normal_interval: Duration,
    cancel: CancellationToken,
) {
    let mut seen = SeenComments::new();
    loop {
        if cancel.is_cancelled() {
            return;
        }
        if !idle.is_dormant() {
            match tracker.stream_events(&owner, &repos).await {
                Ok(events) => {
                    for event in events {
                        handle_event(event, &store, &teams, &chatbus, &filter, factory.as_ref(), &mut seen).await;
                    }
                }
                Err(error) => tracing::warn!(%error, "issue tracker event poll failed"),
            }
        }

        let delay = idle.adapt_interval(normal_interval, normal_interval * IDLE_INTERVAL_MULTIPLIER);
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

async fn handle_event<C: Clock>(
    event: overseer_adapters::TrackerEvent,
    store: &IssueStore,
    teams: &crate::team_manager::TeamManager,
    chatbus: &crate::chatbus::ChatBus<C>,
    filter: &CommentFilter,
    factory: &dyn TeamFactory,
    seen: &mut SeenComments,
) {
    let issue_id = IssueId::new(event.issue_id.clone());
    match event.kind {
        TrackerEventKind::Issues => {
            if let Err(error) = chatbus.append(
                "orchestrator",
                "superintendent",
                &format!("issue {} updated upstream", event.issue_id),
            ) {
                tracing::warn!(%error, "failed to notify superintendent of issue update");
            }
        }
        TrackerEventKind::PullRequest => {
            if let Ok(Some(mut issue)) = store.get(&issue_id) {
                issue.status = IssueStatus::Closed;
                issue.assigned_team = 0;
                if let Err(error) = store.put(&issue) {
                    tracing::warn!(%error, "failed to close issue after merged pull request");
                }
            }
            match teams.disband_by_issue(&event.issue_id) {
                Ok(team) => factory.teardown(&team).await,
                Err(error) => {
                    tracing::debug!(%error, issue_id = %event.issue_id, "no team to disband for merged pull request");
                }
            }
            if let Err(error) = chatbus.append(
                "orchestrator",
                "superintendent",
                &format!("issue {} closed after merged pull request", event.issue_id),
            ) {
                tracing::warn!(%error, "failed to notify superintendent of merged pull request");
            }
        }
        TrackerEventKind::IssueComment => {
            let Some(comment) = event.comment else { return };
            if !seen.insert_if_new(&event.issue_id, &comment.id) {
                return;
            }
            let issue_status = store.get(&issue_id).ok().flatten().map(|i| i.status).unwrap_or(IssueStatus::Open);
            let assigned_team = store.get(&issue_id).ok().flatten().map(|i| i.assigned_team).unwrap_or(0);
            if !filter.passes(&comment.author, &comment.body, issue_status) {
                return;
            }
            let forwarded = format!("comment on issue {}: {}", event.issue_id, comment.body);
            let _ = chatbus.append("orchestrator", "superintendent", &forwarded);
            if assigned_team != 0 {
                let _ = chatbus.append("orchestrator", &format!("engineer-{assigned_team}"), &forwarded);
            }
        }
    }
}

#[cfg(test)]
#[path = "pollers_tests.rs"]
mod tests;
