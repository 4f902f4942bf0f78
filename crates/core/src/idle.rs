// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idle/dormancy state.
//!
//! Pure data only: when the issue backlog empties, the orchestrator enters
//! an idle state after `idle_threshold` and a deeper dormancy state after
//! `dormancy_threshold`. The controller that owns a `Mutex<IdleState>` and
//! drives transitions against a `Clock` lives in the engine crate; this
//! type only holds the fields and the transition predicates so both the
//! controller and its tests can reason about them without a clock.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleState {
    /// Whether any claimable or in-progress issue currently exists.
    pub has_issues: bool,
    /// Epoch ms at which the backlog last became empty, `None` while
    /// `has_issues` is true.
    pub issues_gone_at_ms: Option<u64>,
    pub idle_threshold: Duration,
    pub dormancy_threshold: Duration,
}

impl IdleState {
    pub fn new(idle_threshold: Duration, dormancy_threshold: Duration) -> Self {
        Self {
            has_issues: true,
            issues_gone_at_ms: None,
            idle_threshold,
            dormancy_threshold,
        }
    }

    /// Record that the backlog now has (or still has) issues; clears any
    /// pending idle/dormancy clock.
    pub fn observe_issues_present(&mut self) {
        self.has_issues = true;
        self.issues_gone_at_ms = None;
    }

    /// Record that the backlog is now empty, starting the idle clock if it
    /// was not already running.
    pub fn observe_issues_absent(&mut self, now_ms: u64) {
        if self.has_issues {
            self.has_issues = false;
            self.issues_gone_at_ms = Some(now_ms);
        }
    }

    pub fn is_idle(&self, now_ms: u64) -> bool {
        self.elapsed_since_empty(now_ms)
            .is_some_and(|elapsed| elapsed >= self.idle_threshold.as_millis() as u64)
    }

    pub fn is_dormant(&self, now_ms: u64) -> bool {
        self.elapsed_since_empty(now_ms)
            .is_some_and(|elapsed| elapsed >= self.dormancy_threshold.as_millis() as u64)
    }

    fn elapsed_since_empty(&self, now_ms: u64) -> Option<u64> {
        self.issues_gone_at_ms.map(|since| now_ms.saturating_sub(since))
    }
}

#[cfg(test)]
#[path = "idle_tests.rs"]
mod tests;
