//! Run preparation.
//!
//! A run forks N attempts from the repository's current commit. Each attempt
//! is a branch `arena/<run_tag>/attempt-<n>` checked out in its own worktree
//! under `<runs_dir>/<run_tag>/`, and the finished run is described by a
//! `manifest.json` next to the worktrees.

mod manifest;
mod orchestrator;

pub use manifest::{Attempt, BRANCH_PREFIX, MANIFEST_FILE, RunManifest, attempt_branch, run_branch_pattern};
pub use orchestrator::{CleanReport, Orchestrator, RunEntry, runs_root};
