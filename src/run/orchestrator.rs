//! Orchestrator prepares runs: one worktree per attempt plus a manifest.

use super::manifest::{Attempt, MANIFEST_FILE, RunManifest, run_branch_pattern};
use crate::config::{RunDescription, validate_run_tag};
use crate::error::{ArenaError, Result};
use crate::git::Git;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A run directory found under the runs root.
#[derive(Debug, Clone, PartialEq)]
pub struct RunEntry {
    pub run_tag: String,
    pub run_directory: PathBuf,
    /// `None` when the run never finished writing its manifest
    pub manifest: Option<RunManifest>,
}

impl RunEntry {
    /// Check whether the run completed.
    pub fn is_complete(&self) -> bool {
        self.manifest.is_some()
    }
}

/// What [`Orchestrator::clean`] removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    pub run_directory: PathBuf,
    pub worktrees_removed: Vec<PathBuf>,
    pub branches_deleted: Vec<String>,
}

/// Drives git to lay out runs.
///
/// Every operation resolves the repository from an explicit starting
/// directory; nothing depends on the process working directory.
#[derive(Debug)]
pub struct Orchestrator<G: Git> {
    git: G,
}

impl<G: Git> Orchestrator<G> {
    /// Create an orchestrator backed by the given git implementation.
    pub fn new(git: G) -> Self {
        Self { git }
    }

    /// Prepare a run and return the path of its manifest.
    ///
    /// Side effects happen strictly in order: run directory, then one
    /// branch and worktree per attempt, then the manifest. The first failure
    /// aborts the run; nothing already created is rolled back and no
    /// manifest is written.
    pub fn prepare(&self, description: &RunDescription, start_dir: &Path, runs_dir: &Path) -> Result<PathBuf> {
        let repo_root = self.git.repo_root(start_dir)?;
        self.git.ensure_clean(&repo_root)?;
        let base_commit = self.git.head_commit(&repo_root)?;

        let run_directory = runs_root(&repo_root, runs_dir).join(description.run_tag());
        create_run_directory(&run_directory)?;

        log::info!("Preparing run '{}' at {}", description.run_tag(), run_directory.display());

        let mut attempts = Vec::new();
        for idx in 1..=description.attempt_count() {
            let attempt = Attempt::new(description.run_tag(), idx, &run_directory);
            log::info!(" - creating worktree {} ({})", attempt.worktree_path.display(), attempt.branch);
            self.git
                .create_worktree(&repo_root, &attempt.branch, &attempt.worktree_path, &base_commit)?;
            attempts.push(attempt);
        }

        let manifest = RunManifest::new(description, base_commit, repo_root, &run_directory, attempts);
        let manifest_path = run_directory.join(MANIFEST_FILE);
        manifest.write(&manifest_path)?;

        log::info!("Run manifest written to {}", manifest_path.display());
        Ok(manifest_path)
    }

    /// Load the manifest of a completed run.
    pub fn load_manifest(&self, start_dir: &Path, runs_dir: &Path, run_tag: &str) -> Result<RunManifest> {
        validate_run_tag(run_tag)?;
        let repo_root = self.git.repo_root(start_dir)?;
        let run_directory = runs_root(&repo_root, runs_dir).join(run_tag);
        let manifest_path = run_directory.join(MANIFEST_FILE);

        if !manifest_path.is_file() {
            let state = if run_directory.is_dir() { "incomplete" } else { "unknown" };
            return Err(ArenaError::Orchestration(format!(
                "No manifest for run '{}' at {} (run is {})",
                run_tag,
                manifest_path.display(),
                state
            )));
        }

        RunManifest::load(&manifest_path)
    }

    /// List every run directory under the runs root, sorted by tag.
    pub fn list_runs(&self, start_dir: &Path, runs_dir: &Path) -> Result<Vec<RunEntry>> {
        let repo_root = self.git.repo_root(start_dir)?;
        let root = runs_root(&repo_root, runs_dir);
        if !root.is_dir() {
            log::debug!("Runs root {} does not exist", root.display());
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let run_directory = entry.path();
            let manifest_path = run_directory.join(MANIFEST_FILE);
            let manifest = if manifest_path.is_file() {
                match RunManifest::load(&manifest_path) {
                    Ok(manifest) => Some(manifest),
                    Err(e) => {
                        log::warn!("Ignoring unreadable manifest {}: {}", manifest_path.display(), e);
                        None
                    }
                }
            } else {
                None
            };

            runs.push(RunEntry {
                run_tag: entry.file_name().to_string_lossy().to_string(),
                run_directory,
                manifest,
            });
        }

        runs.sort_by(|a, b| a.run_tag.cmp(&b.run_tag));
        Ok(runs)
    }

    /// Remove a run's worktrees, branches and directory.
    ///
    /// Works for incomplete runs too: worktrees are discovered from git, not
    /// from the manifest.
    pub fn clean(&self, start_dir: &Path, runs_dir: &Path, run_tag: &str, keep_branches: bool) -> Result<CleanReport> {
        validate_run_tag(run_tag)?;
        let repo_root = self.git.repo_root(start_dir)?;
        let run_directory = runs_root(&repo_root, runs_dir).join(run_tag);

        if !run_directory.is_dir() {
            return Err(ArenaError::Orchestration(format!(
                "Run directory not found: {}",
                run_directory.display()
            )));
        }

        let canonical_run_directory = fs::canonicalize(&run_directory)?;
        let mut report = CleanReport {
            run_directory: run_directory.clone(),
            ..Default::default()
        };

        for worktree in self.git.list_worktrees(&repo_root)? {
            let canonical = fs::canonicalize(&worktree).unwrap_or_else(|_| worktree.clone());
            if !canonical.starts_with(&canonical_run_directory) {
                continue;
            }
            log::info!(" - removing worktree {}", worktree.display());
            self.git.remove_worktree(&repo_root, &worktree)?;
            report.worktrees_removed.push(worktree);
        }

        if keep_branches {
            log::info!("Keeping branches matching {}", run_branch_pattern(run_tag));
        } else {
            for branch in self.git.list_branches(&repo_root, &run_branch_pattern(run_tag))? {
                log::info!(" - deleting branch {}", branch);
                self.git.delete_branch(&repo_root, &branch)?;
                report.branches_deleted.push(branch);
            }
        }

        fs::remove_dir_all(&run_directory).map_err(|e| {
            ArenaError::Orchestration(format!("Failed to remove run directory {}: {}", run_directory.display(), e))
        })?;

        log::info!("Run '{}' cleaned", run_tag);
        Ok(report)
    }
}

/// Directory holding run directories: `runs_dir` if absolute, else under the repo root.
pub fn runs_root(repo_root: &Path, runs_dir: &Path) -> PathBuf {
    if runs_dir.is_absolute() {
        runs_dir.to_path_buf()
    } else {
        repo_root.join(runs_dir)
    }
}

/// Create the run directory, failing if it already exists.
fn create_run_directory(run_directory: &Path) -> Result<()> {
    if let Some(parent) = run_directory.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ArenaError::Orchestration(format!("Failed to create runs directory {}: {}", parent.display(), e))
        })?;
    }

    // create_dir is atomic: two runs racing for the same tag cannot both win
    fs::create_dir(run_directory).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => {
            ArenaError::Orchestration(format!("Run directory already exists: {}", run_directory.display()))
        }
        _ => ArenaError::Orchestration(format!(
            "Failed to create run directory {}: {}",
            run_directory.display(),
            e
        )),
    })
}
