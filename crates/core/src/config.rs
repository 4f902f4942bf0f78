// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! Deserialized from a single TOML file, re-read on a mtime poll by the
//! engine's config watcher and republished through a `watch` channel.
//! Validation failures here are always fatal at startup; failures
//! encountered during a hot-reload are logged and the previous config is
//! kept in place.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTreeConfig {
    /// Root of the repository a team's worktree is created from.
    pub path: PathBuf,
    /// Branch the `RELEASE` command merges into `main`.
    pub develop_branch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub owner: String,
    pub repos: Vec<String>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_event_poll_interval_secs")]
    pub event_poll_interval_secs: u64,
    /// Author logins exempt from bot-comment suppression.
    #[serde(default)]
    pub allowed_authors: Vec<String>,
    /// Patterns matched against a comment author login to suppress
    /// bot-originated comments beyond the allowlist.
    #[serde(default)]
    pub bot_detection_patterns: Vec<String>,
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_event_poll_interval_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub superintendent_model: String,
    pub engineer_model: String,
    pub superintendent_prompt_path: PathBuf,
    pub engineer_prompt_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub max_teams: u32,
    pub data_dir: PathBuf,
    pub source_trees: Vec<SourceTreeConfig>,
    #[serde(default = "default_idle_threshold_secs")]
    pub idle_threshold_secs: u64,
    #[serde(default = "default_dormancy_threshold_secs")]
    pub dormancy_threshold_secs: u64,
    #[serde(default = "default_chatlog_max_lines")]
    pub chatlog_max_lines: usize,
    #[serde(default = "default_context_reset_interval_secs")]
    pub context_reset_interval_secs: u64,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
    #[serde(default = "default_main_check_interval_hours")]
    pub main_check_interval_hours: u64,
    #[serde(default = "default_doc_check_interval_hours")]
    pub doc_check_interval_hours: u64,
    #[serde(default = "default_bash_timeout_minutes")]
    pub bash_timeout_minutes: u64,
    #[serde(default = "default_agent_kill_grace_secs")]
    pub agent_kill_grace_secs: u64,
    pub feature_prefix: Option<String>,
    pub tracker: TrackerConfig,
    pub models: ModelConfig,
}

fn default_idle_threshold_secs() -> u64 {
    300
}

fn default_dormancy_threshold_secs() -> u64 {
    3600
}

fn default_chatlog_max_lines() -> usize {
    500
}

fn default_context_reset_interval_secs() -> u64 {
    7200
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}

fn default_main_check_interval_hours() -> u64 {
    6
}

fn default_doc_check_interval_hours() -> u64 {
    24
}

fn default_bash_timeout_minutes() -> u64 {
    10
}

fn default_agent_kill_grace_secs() -> u64 {
    15
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn bash_timeout(&self) -> Duration {
        Duration::from_secs(self.bash_timeout_minutes * 60)
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }

    pub fn dormancy_threshold(&self) -> Duration {
        Duration::from_secs(self.dormancy_threshold_secs)
    }

    pub fn context_reset_interval(&self) -> Duration {
        Duration::from_secs(self.context_reset_interval_secs)
    }

    pub fn agent_kill_grace(&self) -> Duration {
        Duration::from_secs(self.agent_kill_grace_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_teams == 0 {
            return Err(ConfigError::Invalid("max_teams must be at least 1".into()));
        }
        // idle_threshold_secs == 0 makes idle mode trigger immediately once
        // the backlog empties; dormancy_threshold_secs == 0 disables
        // dormancy entirely. Only a *non-zero* dormancy shorter than idle
        // is a misconfiguration.
        if self.dormancy_threshold_secs != 0
            && self.idle_threshold_secs != 0
            && self.dormancy_threshold_secs < self.idle_threshold_secs
        {
            return Err(ConfigError::Invalid(
                "dormancy_threshold_secs must be >= idle_threshold_secs unless one is 0".into(),
            ));
        }
        if self.source_trees.is_empty() {
            return Err(ConfigError::Invalid("at least one source tree is required".into()));
        }
        if self.tracker.owner.is_empty() {
            return Err(ConfigError::Invalid("tracker.owner must not be empty".into()));
        }
        if self.tracker.repos.is_empty() {
            return Err(ConfigError::Invalid("tracker.repos must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
