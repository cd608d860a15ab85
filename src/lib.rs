//! code-arena - parallel git worktree attempts from a single run description
//!
//! A run description (TOML) expands into N git worktrees, each on its own
//! branch forked from the same base commit, and a JSON manifest recording
//! the result for whatever tool runs the experiments afterwards.

pub mod config;
pub mod error;
pub mod git;
pub mod run;

pub use error::{ArenaError, Result};
