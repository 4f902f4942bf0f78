// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hot-reload for the daemon config file.
//!
//! Polls mtime rather than using a filesystem-notification crate — the
//! config file lives on whatever filesystem the operator chose and
//! inotify-style watches are unreliable over network mounts; a 500 ms poll
//! is cheap and uniform everywhere. `watch::channel` gives the
//! replace-older-unread semantics natively (a late-arriving value
//! overwrites the cached one the receiver hasn't read yet), so there is no
//! manually drained `mpsc(1)` to get right.

use overseer_core::{Config, ConfigError};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum ConfigWatcherError {
    #[error("failed to read initial config at {path}: {source}")]
    InitialRead { path: PathBuf, #[source] source: std::io::Error },
    #[error("initial config at {path} is invalid: {source}")]
    InitialParse { path: PathBuf, #[source] source: ConfigError },
}

/// Loads `path` once (failure here is fatal) and spawns a task that polls
/// its mtime, pushing freshly-validated configs onto the returned
/// receiver. A parse/validation failure on a later poll is logged and the
/// previously published config is kept.
pub fn spawn(
    path: PathBuf,
    cancel: CancellationToken,
) -> Result<(Config, watch::Receiver<Config>), ConfigWatcherError> {
    let initial = load(&path).map_err(|source| match source {
        LoadError::Io(source) => ConfigWatcherError::InitialRead { path: path.clone(), source },
        LoadError::Parse(source) => ConfigWatcherError::InitialParse { path: path.clone(), source },
    })?;

    let (tx, rx) = watch::channel(initial.clone());
    let initial_mtime = mtime(&path);
    tokio::spawn(poll_loop(path, initial_mtime, tx, cancel));
    Ok((initial, rx))
}

enum LoadError {
    Io(std::io::Error),
    Parse(ConfigError),
}

fn load(path: &Path) -> Result<Config, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(LoadError::Io)?;
    Config::from_toml_str(&contents).map_err(LoadError::Parse)
}

fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

async fn poll_loop(path: PathBuf, mut last_mtime: Option<SystemTime>, tx: watch::Sender<Config>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }

        let current_mtime = mtime(&path);
        if current_mtime == last_mtime {
            continue;
        }
        last_mtime = current_mtime;

        match load(&path) {
            Ok(config) => {
                if tx.send(config).is_err() {
                    return;
                }
            }
            Err(LoadError::Io(error)) => {
                tracing::warn!(path = %path.display(), %error, "config hot-reload: failed to read file");
            }
            Err(LoadError::Parse(error)) => {
                tracing::warn!(path = %path.display(), %error, "config hot-reload: invalid config, keeping previous");
            }
        }
    }
}

#[cfg(test)]
#[path = "config_watcher_tests.rs"]
mod tests;
