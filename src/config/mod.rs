//! Configuration for code-arena.
//!
//! Two independent layers:
//! 1. Tool settings (~/.config/code-arena/code-arena.yml or ./code-arena.yml)
//! 2. Run descriptions (one TOML file per run, passed on the command line)

pub use self::run::{RunDescription, validate_run_tag};
pub use self::settings::{DEFAULT_GIT_PROGRAM, DEFAULT_RUNS_DIR, Settings};

mod run;
mod settings;
