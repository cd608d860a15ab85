//! CLI module for code-arena - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
