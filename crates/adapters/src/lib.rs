// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real and fake implementations of the collaborator traits `core` defines:
//! version control, the agent child-process runtime, the upstream issue
//! tracker, and desktop notifications. Each real adapter has a `Fake*`
//! sibling behind the `test-support` feature for use by engine/daemon tests.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod agent_runtime;
pub mod notify;
pub mod tracker;
pub mod vcs;

pub use agent_runtime::{AgentHandle, AgentRuntime, AgentRuntimeError, ChildProcessAgentRuntime, classify_exit};
pub use notify::{DesktopNotifyAdapter, NotifyAdapter, NotifyError};
pub use tracker::{Comment, HttpTrackerAdapter, IssueTrackerAdapter, RemoteIssue, TrackerError, TrackerEvent, TrackerEventKind};
pub use vcs::{GitVcsAdapter, VcsAdapter, VcsError};

#[cfg(any(test, feature = "test-support"))]
pub use agent_runtime::FakeAgentRuntime;
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use tracker::FakeTrackerAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use vcs::FakeVcsAdapter;
