//! Run manifest and attempt records.

use crate::config::RunDescription;
use crate::error::{ArenaError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the manifest inside a run directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Prefix shared by every attempt branch.
pub const BRANCH_PREFIX: &str = "arena";

/// One isolated working copy forked from the run's base commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// `attempt-<index>`, 1-based
    pub name: String,
    /// `arena/<run_tag>/<name>`
    pub branch: String,
    /// `<run_directory>/<name>`
    pub worktree_path: PathBuf,
}

impl Attempt {
    /// Build the record for attempt `index` (1-based) of a run.
    pub fn new(run_tag: &str, index: u32, run_directory: &Path) -> Self {
        let name = format!("attempt-{}", index);
        Self {
            branch: attempt_branch(run_tag, &name),
            worktree_path: run_directory.join(&name),
            name,
        }
    }
}

/// Branch name for an attempt of a run.
pub fn attempt_branch(run_tag: &str, name: &str) -> String {
    format!("{}/{}/{}", BRANCH_PREFIX, run_tag, name)
}

/// `git branch --list` pattern matching every attempt branch of a run.
pub fn run_branch_pattern(run_tag: &str) -> String {
    format!("{}/{}/*", BRANCH_PREFIX, run_tag)
}

/// Persisted record of a completed run.
///
/// Written once, after every attempt worktree exists. A run directory
/// without a manifest is an incomplete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_tag: String,
    pub attempt_count: u32,
    pub base_commit: String,
    pub created_at: DateTime<Utc>,
    pub repo_root: PathBuf,
    pub run_directory: PathBuf,
    pub cli_command: Vec<String>,
    pub prompt: String,
    pub attempts: Vec<Attempt>,
}

impl RunManifest {
    /// Assemble the manifest for a run, stamped with the current UTC time.
    pub fn new(
        description: &RunDescription,
        base_commit: impl Into<String>,
        repo_root: impl Into<PathBuf>,
        run_directory: impl Into<PathBuf>,
        attempts: Vec<Attempt>,
    ) -> Self {
        Self {
            run_tag: description.run_tag().to_string(),
            attempt_count: description.attempt_count(),
            base_commit: base_commit.into(),
            created_at: Utc::now(),
            repo_root: repo_root.into(),
            run_directory: run_directory.into(),
            cli_command: description.command().to_vec(),
            prompt: description.prompt().to_string(),
            attempts,
        }
    }

    /// Write as 2-space indented JSON with a trailing newline.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a manifest previously written by [`RunManifest::write`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ArenaError::Orchestration(format!("Failed to read manifest {}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&content)?)
    }
}
