// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loads a role's system prompt template from disk and interpolates it.

use crate::template::interpolate;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("failed to read prompt template {path}: {source}")]
    Io { path: std::path::PathBuf, #[source] source: std::io::Error },
}

/// Read the template at `template_path` and interpolate `vars` into it.
/// Used by agent setup to build the superintendent/engineer system prompt
/// handed to each spawned process.
pub fn render_system_prompt(template_path: &Path, vars: &HashMap<String, String>) -> Result<String, PromptError> {
    let template = std::fs::read_to_string(template_path)
        .map_err(|source| PromptError::Io { path: template_path.to_path_buf(), source })?;
    Ok(interpolate(&template, vars))
}

#[cfg(test)]
#[path = "system_prompt_tests.rs"]
mod tests;
