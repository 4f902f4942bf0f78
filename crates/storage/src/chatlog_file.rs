// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only chat-log file primitive.
//!
//! The chat log is one text file shared by every agent on the host.
//! Appends are serialized through a single process-wide mutex and opened
//! with `O_APPEND` so concurrent writers (the superintendent and every
//! engineer) never interleave partial lines even without the lock, the
//! lock just keeps each write a single line. Truncation (used when an
//! operator runs `overseer release` to clear history) goes through a
//! temp-file-then-rename so a reader tailing the file never observes a
//! zero-length window.

use overseer_core::chatlog::ChatMessage;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatLogFileError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Identifies a specific inode/size combination of the chat-log file, used
/// by tail-follow readers to detect truncation or rotation: if the device
/// or inode changes, or the size shrinks, the file was replaced out from
/// under the reader and it must reopen from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdentity {
    dev: u64,
    ino: u64,
    len: u64,
}

impl FileIdentity {
    pub fn of(file: &File) -> std::io::Result<Self> {
        let meta = file.metadata()?;
        Ok(Self {
            dev: meta.dev(),
            ino: meta.ino(),
            len: meta.size(),
        })
    }

    /// True if `other` represents the file continuing to grow in place
    /// rather than being replaced or truncated.
    pub fn still_same_file(&self, other: &FileIdentity) -> bool {
        self.dev == other.dev && self.ino == other.ino && other.len >= self.len
    }
}

/// Append-only handle to the shared chat-log file.
#[derive(Clone)]
pub struct ChatLogFile {
    path: PathBuf,
    append_lock: Arc<Mutex<()>>,
}

impl ChatLogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one message as a single line. Creates the file and its
    /// parent directory if missing.
    pub fn append(&self, message: &ChatMessage) -> Result<(), ChatLogFileError> {
        let _guard = self.append_lock.lock();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ChatLogFileError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| ChatLogFileError::Io {
                path: self.path.clone(),
                source,
            })?;
        file.write_all(message.encode().as_bytes())
            .map_err(|source| ChatLogFileError::Io {
                path: self.path.clone(),
                source,
            })
    }

    /// Read every line currently in the file, decoded with the given
    /// timestamp (the chat-log wire format carries no timestamp of its own).
    pub fn read_all(&self, observed_at_ms: u64) -> Result<Vec<ChatMessage>, ChatLogFileError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ChatLogFileError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(contents
            .lines()
            .filter_map(|line| ChatMessage::decode(line, observed_at_ms).ok())
            .collect())
    }

    /// Open the file for tail-following and return its current identity,
    /// the baseline a watcher compares subsequent reads against.
    pub fn open_for_tail(&self) -> Result<(File, FileIdentity), ChatLogFileError> {
        let file = OpenOptions::new()
            .read(true)
            .create(true)
            .write(true)
            .open(&self.path)
            .map_err(|source| ChatLogFileError::Io {
                path: self.path.clone(),
                source,
            })?;
        let identity = FileIdentity::of(&file).map_err(|source| ChatLogFileError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok((file, identity))
    }

    /// Atomically rewrite the file to keep only its last `max_lines`
    /// lines, used by the chatlog-truncator janitor to bound file size.
    /// `max_lines = 0` clears the file entirely, which is also how
    /// `overseer release` resets history.
    pub fn truncate_to_last_n_lines(&self, max_lines: usize) -> Result<(), ChatLogFileError> {
        let _guard = self.append_lock.lock();
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(ChatLogFileError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let lines: Vec<&str> = contents.lines().collect();
        let kept = if lines.len() > max_lines {
            &lines[lines.len() - max_lines..]
        } else {
            &lines[..]
        };
        let mut new_contents = kept.join("\n");
        if !kept.is_empty() {
            new_contents.push('\n');
        }

        let tmp_path = self.path.with_extension("log.tmp");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ChatLogFileError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&tmp_path, new_contents.as_bytes()).map_err(|source| ChatLogFileError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| ChatLogFileError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "chatlog_file_tests.rs"]
mod tests;
