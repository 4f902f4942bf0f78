// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-based persistence: the issue mirror and the chat-log file
//! primitive. No network or subprocess I/O lives here; see the adapters
//! crate for that.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod chatlog_file;
pub mod issue_store;

pub use chatlog_file::{ChatLogFile, ChatLogFileError, FileIdentity};
pub use issue_store::{IssueStore, IssueStoreError};
