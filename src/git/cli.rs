//! GitCli runs the git executable for repository operations.

use super::Git;
use crate::config::DEFAULT_GIT_PROGRAM;
use crate::error::{ArenaError, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Stateless wrapper around the git command line.
///
/// Each operation is a single blocking invocation; a non-zero exit status is
/// turned into a repository error carrying git's own message.
#[derive(Debug, Clone)]
pub struct GitCli {
    /// Executable to invoke
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(DEFAULT_GIT_PROGRAM)
    }
}

impl GitCli {
    /// Create a wrapper that runs `program` (usually just `git`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run git with `args` in `cwd` and return trimmed stdout.
    fn run<I, S>(&self, cwd: &Path, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        let rendered = args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        log::debug!("Running git {} in {}", rendered, cwd.display());

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(cwd)
            .output()
            .map_err(|e| ArenaError::Repository(format!("failed to execute {}: {}", self.program, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if !stderr.is_empty() {
                stderr
            } else if !stdout.is_empty() {
                stdout
            } else {
                "git command failed".to_string()
            };
            return Err(ArenaError::Repository(format!("git {}: {}", rendered, message)));
        }

        Ok(stdout)
    }
}

impl Git for GitCli {
    fn repo_root(&self, start_dir: &Path) -> Result<PathBuf> {
        self.run(start_dir, ["rev-parse", "--show-toplevel"])
            .map(PathBuf::from)
            .map_err(|e| {
                log::debug!("repo root lookup failed: {}", e);
                ArenaError::Repository(format!(
                    "Not inside a Git repository ({}). Initialize or cd into a repo.",
                    start_dir.display()
                ))
            })
    }

    fn head_commit(&self, repo_root: &Path) -> Result<String> {
        self.run(repo_root, ["rev-parse", "HEAD"])
    }

    fn ensure_clean(&self, repo_root: &Path) -> Result<()> {
        let status = self.run(repo_root, ["status", "--porcelain"])?;
        if status.is_empty() {
            return Ok(());
        }

        for line in status.lines() {
            log::debug!("pending change: {}", line);
        }
        Err(ArenaError::Repository(format!(
            "Working tree must be clean before starting a run ({} pending change(s))",
            status.lines().count()
        )))
    }

    fn create_worktree(&self, repo_root: &Path, branch: &str, worktree_path: &Path, base_ref: &str) -> Result<()> {
        self.run(
            repo_root,
            [
                OsStr::new("worktree"),
                OsStr::new("add"),
                OsStr::new("-b"),
                OsStr::new(branch),
                worktree_path.as_os_str(),
                OsStr::new(base_ref),
            ],
        )?;
        Ok(())
    }

    fn list_worktrees(&self, repo_root: &Path) -> Result<Vec<PathBuf>> {
        let stdout = self.run(repo_root, ["worktree", "list", "--porcelain"])?;
        Ok(parse_worktree_list(&stdout))
    }

    fn remove_worktree(&self, repo_root: &Path, worktree_path: &Path) -> Result<()> {
        self.run(
            repo_root,
            [
                OsStr::new("worktree"),
                OsStr::new("remove"),
                OsStr::new("--force"),
                worktree_path.as_os_str(),
            ],
        )?;
        Ok(())
    }

    fn list_branches(&self, repo_root: &Path, pattern: &str) -> Result<Vec<String>> {
        let stdout = self.run(repo_root, ["branch", "--list", pattern, "--format=%(refname:short)"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn delete_branch(&self, repo_root: &Path, branch: &str) -> Result<()> {
        self.run(repo_root, ["branch", "-D", branch])?;
        Ok(())
    }
}

/// Extract worktree paths from `git worktree list --porcelain` output.
pub fn parse_worktree_list(stdout: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .filter_map(|line| line.strip_prefix("worktree "))
        .map(PathBuf::from)
        .collect()
}
