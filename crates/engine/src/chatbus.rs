// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fan-out message bus layered on the append-only chat-log file.
//!
//! `watch` spawns a tail-follow task per subscriber rather than sharing one
//! reader across all watchers, trading a little redundant I/O for simple,
//! independent cancellation per watcher (dropping a `WatchHandle` stops its
//! task). Delivery uses a single-slot mailbox instead of a channel so a
//! watcher that falls behind sees the newest message, not a backlog.

use overseer_core::{ChatMessage, Clock};
use overseer_storage::{ChatLogFile, ChatLogFileError};
use parking_lot::Mutex;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ChatBusError {
    #[error(transparent)]
    File(#[from] ChatLogFileError),
}

const TAIL_POLL_INTERVAL: Duration = Duration::from_millis(200);

struct Mailbox {
    slot: Mutex<Option<ChatMessage>>,
    notify: Notify,
}

impl Mailbox {
    fn new() -> Self {
        Self { slot: Mutex::new(None), notify: Notify::new() }
    }

    /// Install the newest message, silently discarding whatever the
    /// watcher had not yet consumed.
    fn put(&self, message: ChatMessage) {
        *self.slot.lock() = Some(message);
        self.notify.notify_one();
    }
}

/// A live subscription to one recipient's messages. Dropping it stops the
/// background tail-follow task.
pub struct WatchHandle {
    mailbox: Arc<Mailbox>,
    cancel: CancellationToken,
}

impl WatchHandle {
    /// Wait for the next message addressed to this watcher's recipient.
    /// Returns `None` once the underlying tail-follow task has stopped.
    pub async fn recv(&self) -> Option<ChatMessage> {
        loop {
            if let Some(message) = self.mailbox.slot.lock().take() {
                return Some(message);
            }
            if self.cancel.is_cancelled() {
                return None;
            }
            tokio::select! {
                _ = self.mailbox.notify.notified() => {}
                _ = self.cancel.cancelled() => return None,
            }
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[derive(Clone)]
pub struct ChatBus<C: Clock> {
    file: ChatLogFile,
    clock: C,
}

impl<C: Clock + 'static> ChatBus<C> {
    pub fn new(file: ChatLogFile, clock: C) -> Self {
        Self { file, clock }
    }

    pub fn append(&self, sender: &str, recipient: &str, body: &str) -> Result<(), ChatBusError> {
        let message = ChatMessage {
            timestamp_ms: self.clock.epoch_ms(),
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            body: body.to_string(),
        };
        self.file.append(&message).map_err(Into::into)
    }

    pub fn poll(&self, recipient: &str) -> Result<Vec<ChatMessage>, ChatBusError> {
        let now = self.clock.epoch_ms();
        Ok(self.file.read_all(now)?.into_iter().filter(|m| m.recipient == recipient).collect())
    }

    pub fn truncate(&self, max_lines: usize) -> Result<(), ChatBusError> {
        self.file.truncate_to_last_n_lines(max_lines).map_err(Into::into)
    }

    /// Subscribe to new messages addressed to `recipient`, starting at the
    /// file's current tail.
    pub fn watch(&self, recipient: impl Into<String>) -> Result<WatchHandle, ChatBusError> {
        let recipient = recipient.into();
        let mailbox = Arc::new(Mailbox::new());
        let cancel = CancellationToken::new();
        let file = self.file.clone();
        let task_mailbox = Arc::clone(&mailbox);
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            if let Err(error) = tail_follow(file, recipient, task_mailbox, task_cancel).await {
                tracing::warn!(%error, "chat-log tail-follow task exited");
            }
        });

        Ok(WatchHandle { mailbox, cancel })
    }
}

async fn tail_follow(
    file: ChatLogFile,
    recipient: String,
    mailbox: Arc<Mailbox>,
    cancel: CancellationToken,
) -> Result<(), ChatBusError> {
    let (mut handle, mut identity) = file.open_for_tail()?;
    handle
        .seek(SeekFrom::End(0))
        .map_err(|source| ChatLogFileError::Io { path: file.path().to_path_buf(), source })?;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = tokio::time::sleep(TAIL_POLL_INTERVAL) => {}
        }

        let (fresh_handle, fresh_identity) = file.open_for_tail()?;
        if !identity.still_same_file(&fresh_identity) {
            handle = fresh_handle;
            handle
                .seek(SeekFrom::Start(0))
                .map_err(|source| ChatLogFileError::Io { path: file.path().to_path_buf(), source })?;
        }
        identity = fresh_identity;

        let mut reader = BufReader::new(&mut handle);
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = reader
                .read_line(&mut line)
                .map_err(|source| ChatLogFileError::Io { path: file.path().to_path_buf(), source })?;
            if bytes_read == 0 {
                break;
            }
            let trimmed = line.trim_end_matches('\n');
            if trimmed.is_empty() {
                continue;
            }
            let now_ms = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            if let Ok(message) = ChatMessage::decode(trimmed, now_ms) {
                if message.recipient == recipient {
                    mailbox.put(message);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "chatbus_tests.rs"]
mod tests;
