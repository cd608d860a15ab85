//! Git access for run preparation.
//!
//! The orchestrator only talks to git through the [`Git`] trait, so it can be
//! driven by [`GitCli`] in production and by a recording fake in tests.

mod cli;

pub use cli::{GitCli, parse_worktree_list};

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Blocking git operations used to prepare and clean up runs.
///
/// Every failed invocation surfaces as [`ArenaError::Repository`](crate::error::ArenaError::Repository).
pub trait Git {
    /// Top-level directory of the repository containing `start_dir`.
    fn repo_root(&self, start_dir: &Path) -> Result<PathBuf>;

    /// Commit hash currently checked out in `repo_root`.
    fn head_commit(&self, repo_root: &Path) -> Result<String>;

    /// Fail unless the working tree has no staged, unstaged or untracked changes.
    fn ensure_clean(&self, repo_root: &Path) -> Result<()>;

    /// Create a worktree at `worktree_path` on a new branch `branch` starting at `base_ref`.
    fn create_worktree(&self, repo_root: &Path, branch: &str, worktree_path: &Path, base_ref: &str) -> Result<()>;

    /// Paths of all worktrees registered with the repository, main one included.
    fn list_worktrees(&self, repo_root: &Path) -> Result<Vec<PathBuf>>;

    /// Remove a worktree, discarding any changes inside it.
    fn remove_worktree(&self, repo_root: &Path, worktree_path: &Path) -> Result<()>;

    /// Local branches matching a `git branch --list` pattern.
    fn list_branches(&self, repo_root: &Path, pattern: &str) -> Result<Vec<String>>;

    /// Force-delete a local branch.
    fn delete_branch(&self, repo_root: &Path, branch: &str) -> Result<()>;
}
