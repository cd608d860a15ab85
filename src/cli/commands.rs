//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: prepare worktrees and a manifest from a run description
//! - show: print the attempts of a completed run
//! - list: list runs and whether they completed
//! - clean: remove a run's worktrees, branches and directory

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// code-arena - Prepare parallel git worktree attempts for experiments
#[derive(Parser, Debug)]
#[command(name = "code-arena")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional settings file path
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare worktrees and manifest for a run
    Run {
        /// Path to the TOML run description
        #[arg(short, long = "config")]
        config: PathBuf,

        /// Directory for run artifacts, relative to the repo root unless absolute [default: .arena/runs]
        #[arg(long)]
        runs_dir: Option<PathBuf>,

        /// Override attempt_count from the run description
        #[arg(long, allow_negative_numbers = true)]
        attempts: Option<i64>,
    },

    /// Show the attempts recorded in a run's manifest
    Show {
        /// Run tag to show
        run_tag: String,

        /// Directory for run artifacts [default: .arena/runs]
        #[arg(long)]
        runs_dir: Option<PathBuf>,
    },

    /// List runs and whether they completed
    List {
        /// Directory for run artifacts [default: .arena/runs]
        #[arg(long)]
        runs_dir: Option<PathBuf>,
    },

    /// Remove a run's worktrees, branches and directory
    Clean {
        /// Run tag to clean
        run_tag: String,

        /// Directory for run artifacts [default: .arena/runs]
        #[arg(long)]
        runs_dir: Option<PathBuf>,

        /// Keep the attempt branches, only remove worktrees
        #[arg(short, long)]
        keep_branches: bool,
    },
}

impl Commands {
    /// Runs directory given on the command line, if any
    pub fn runs_dir(&self) -> Option<&PathBuf> {
        match self {
            Commands::Run { runs_dir, .. }
            | Commands::Show { runs_dir, .. }
            | Commands::List { runs_dir }
            | Commands::Clean { runs_dir, .. } => runs_dir.as_ref(),
        }
    }
}
