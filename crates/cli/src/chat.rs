// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opens the same chat-log file the daemon tails and appends a command
//! line addressed to `orchestrator`. The CLI has no IPC channel into the
//! running daemon — it is just another writer of the shared chat log.

use overseer_core::{Config, SystemClock};
use overseer_engine::ChatBus;
use overseer_storage::ChatLogFile;

pub fn send_command(config: &Config, body: &str) -> anyhow::Result<()> {
    let bus = ChatBus::new(ChatLogFile::new(config.data_dir.join("chatlog.txt")), SystemClock);
    bus.append("cli", "orchestrator", body)?;
    Ok(())
}
