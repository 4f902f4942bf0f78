// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-per-issue mirror of the upstream tracker.
//!
//! Each issue is stored as `<issues_dir>/<issue-id>.json`, written with a
//! temp-file-then-rename so readers (the CLI, the engine's pollers) never
//! observe a half-written file. Writes to the same issue are serialized
//! through a per-ID lock shard so concurrent sync-loop and event-loop
//! updates to different issues don't contend on a single mutex.

use overseer_core::{Issue, IssueFilter, IssueId};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IssueStoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode issue file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

const SHARD_COUNT: usize = 16;

/// File-backed [`Issue`] store. Cheap to clone; shares the lock shards and
/// directory path with every clone.
#[derive(Clone)]
pub struct IssueStore {
    issues_dir: PathBuf,
    shards: Arc<Vec<Mutex<()>>>,
}

impl IssueStore {
    pub fn new(issues_dir: impl Into<PathBuf>) -> Self {
        Self {
            issues_dir: issues_dir.into(),
            shards: Arc::new((0..SHARD_COUNT).map(|_| Mutex::new(())).collect()),
        }
    }

    fn shard_for(&self, id: &IssueId) -> &Mutex<()> {
        let hash = id.as_str().bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        &self.shards[hash % SHARD_COUNT]
    }

    fn path_for(&self, id: &IssueId) -> PathBuf {
        self.issues_dir.join(format!("{}.json", id.as_str()))
    }

    pub fn get(&self, id: &IssueId) -> Result<Option<Issue>, IssueStoreError> {
        let path = self.path_for(id);
        let _guard = self.shard_for(id).lock();
        read_issue_file(&path)
    }

    /// Atomically create or replace the stored issue.
    pub fn put(&self, issue: &Issue) -> Result<(), IssueStoreError> {
        let path = self.path_for(&issue.id);
        let _guard = self.shard_for(&issue.id).lock();
        write_issue_file(&self.issues_dir, &path, issue)
    }

    pub fn remove(&self, id: &IssueId) -> Result<(), IssueStoreError> {
        let path = self.path_for(id);
        let _guard = self.shard_for(id).lock();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(IssueStoreError::Io { path, source }),
        }
    }

    /// List every issue in the directory matching `filter`, sorted by ID
    /// for stable output.
    pub fn list(&self, filter: &IssueFilter) -> Result<Vec<Issue>, IssueStoreError> {
        let entries = match fs::read_dir(&self.issues_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(IssueStoreError::Io {
                    path: self.issues_dir.clone(),
                    source,
                })
            }
        };

        let mut issues = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| IssueStoreError::Io {
                path: self.issues_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(issue) = read_issue_file(&path)? {
                if filter.matches(&issue) {
                    issues.push(issue);
                }
            }
        }
        issues.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(issues)
    }
}

fn read_issue_file(path: &Path) -> Result<Option<Issue>, IssueStoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(IssueStoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let issue: Issue = serde_json::from_str(&contents).map_err(|source| IssueStoreError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(issue))
}

fn write_issue_file(dir: &Path, path: &Path, issue: &Issue) -> Result<(), IssueStoreError> {
    fs::create_dir_all(dir).map_err(|source| IssueStoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let tmp_path = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(issue).map_err(|source| IssueStoreError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(&tmp_path, json.as_bytes()).map_err(|source| IssueStoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| IssueStoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "issue_store_tests.rs"]
mod tests;
