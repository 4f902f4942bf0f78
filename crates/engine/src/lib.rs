// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core runtime: the chat-log bus, the idle/dormancy controller, the team
//! manager, the command dispatcher, the upstream pollers, the background
//! janitors, agent supervision, and config hot-reload. No process entry
//! point lives here — the daemon crate wires these together and owns
//! `main`.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod chatbus;
pub mod config_watcher;
pub mod dispatcher;
pub mod idle_controller;
pub mod janitors;
pub mod pollers;
pub mod supervisor;
pub mod team_manager;

pub use chatbus::{ChatBus, ChatBusError, WatchHandle};
pub use config_watcher::{spawn as spawn_config_watcher, ConfigWatcherError};
pub use dispatcher::{Command, CommandDispatcher, DispatchError};
pub use idle_controller::IdleController;
pub use janitors::{branch_cleaner, chatlog_truncator, doc_check, main_branch_check, prune_closed_issues, purge_stale_worktrees};
pub use pollers::{event_loop, sync_loop, CommentFilter};
pub use supervisor::supervise;
pub use team_manager::{TeamFactory, TeamManager};
