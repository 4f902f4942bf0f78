// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat-log message wire format.
//!
//! The chat log is a flat, append-only, tab-separated text file: one
//! message per line, `<sender>\t<recipient>\t<body>\n`. Senders and
//! recipients are agent role names (`superintendent`, `engineer-3`); the
//! storage crate owns the actual file primitive, this module only owns
//! the line encoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub timestamp_ms: u64,
    pub sender: String,
    pub recipient: String,
    pub body: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatLogError {
    #[error("malformed chat log line: {0:?}")]
    Malformed(String),
}

impl ChatMessage {
    /// Encode as one `<sender>\t<recipient>\t<body>\n` line. Tabs and
    /// newlines inside `body` are replaced with a single space so the
    /// line framing can never be broken by message content.
    pub fn encode(&self) -> String {
        let sanitized_body = self
            .body
            .chars()
            .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
            .collect::<String>();
        format!("{}\t{}\t{}\n", self.sender, self.recipient, sanitized_body)
    }

    /// Decode a single line (without trailing newline). The timestamp is
    /// not part of the wire format; callers supply it from the point of
    /// observation (e.g. the file's append time or a tail-follow read).
    pub fn decode(line: &str, timestamp_ms: u64) -> Result<Self, ChatLogError> {
        let mut parts = line.splitn(3, '\t');
        let sender = parts.next().ok_or_else(|| ChatLogError::Malformed(line.to_string()))?;
        let recipient = parts.next().ok_or_else(|| ChatLogError::Malformed(line.to_string()))?;
        let body = parts.next().ok_or_else(|| ChatLogError::Malformed(line.to_string()))?;
        if sender.is_empty() || recipient.is_empty() {
            return Err(ChatLogError::Malformed(line.to_string()));
        }
        Ok(Self {
            timestamp_ms,
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            body: body.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "chatlog_tests.rs"]
mod tests;
