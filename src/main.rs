use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{Level, LevelFilter, debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use code_arena::config::{RunDescription, Settings};
use code_arena::git::GitCli;
use code_arena::run::{Orchestrator, RunManifest};

/// Where the initial log level came from.
enum LevelSource {
    Cli,
    Env,
    Default,
}

fn setup_logging(cli: &Cli) -> Result<LevelSource> {
    let mut builder = env_logger::Builder::new();
    builder.format(|buf, record| {
        let level = match record.level() {
            Level::Error => "ERROR".red(),
            Level::Warn => "WARN ".yellow(),
            Level::Info => "INFO ".green(),
            Level::Debug => "DEBUG".dimmed(),
            Level::Trace => "TRACE".dimmed(),
        };
        writeln!(buf, "[{}] {} {}", chrono::Local::now().format("%H:%M:%S"), level, record.args())
    });

    // Priority: --log-level > --verbose > RUST_LOG > settings file > info
    let source = if let Some(level) = cli.log_level.as_deref() {
        builder.filter_level(parse_level(level)?);
        LevelSource::Cli
    } else if cli.is_verbose() {
        builder.filter_level(LevelFilter::Debug);
        LevelSource::Cli
    } else if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
        LevelSource::Env
    } else {
        // Let everything through the logger; the global max level gates it
        builder.filter_level(LevelFilter::Trace);
        LevelSource::Default
    };

    builder.try_init().context("Failed to initialize logging")?;
    if matches!(source, LevelSource::Default) {
        log::set_max_level(LevelFilter::Info);
    }
    Ok(source)
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level).map_err(|_| eyre::eyre!("Unknown log level '{}'", level))
}

fn run_application(cli: &Cli, settings: &Settings) -> Result<()> {
    let start_dir = std::env::current_dir().context("Failed to determine current directory")?;
    let runs_dir = cli.command.runs_dir().cloned().unwrap_or_else(|| settings.runs_dir.clone());
    let orchestrator = Orchestrator::new(GitCli::new(&settings.git_program));

    match &cli.command {
        Commands::Run { config, attempts, .. } => {
            handle_run_command(&orchestrator, config, *attempts, &start_dir, &runs_dir)
        }
        Commands::Show { run_tag, .. } => handle_show_command(&orchestrator, run_tag, &start_dir, &runs_dir),
        Commands::List { .. } => handle_list_command(&orchestrator, &start_dir, &runs_dir),
        Commands::Clean {
            run_tag, keep_branches, ..
        } => handle_clean_command(&orchestrator, run_tag, *keep_branches, &start_dir, &runs_dir),
    }
}

fn handle_run_command(
    orchestrator: &Orchestrator<GitCli>,
    config: &Path,
    attempts: Option<i64>,
    start_dir: &Path,
    runs_dir: &Path,
) -> Result<()> {
    let description = RunDescription::load(config, attempts)?;
    let manifest_path = orchestrator.prepare(&description, start_dir, runs_dir)?;
    info!("Run setup complete");

    let manifest = RunManifest::load(&manifest_path)?;
    print_attempts(&manifest);
    println!("\n{} {}", "Manifest:".green(), manifest_path.display());
    Ok(())
}

fn handle_show_command(
    orchestrator: &Orchestrator<GitCli>,
    run_tag: &str,
    start_dir: &Path,
    runs_dir: &Path,
) -> Result<()> {
    let manifest = orchestrator.load_manifest(start_dir, runs_dir, run_tag)?;
    println!("{} {}", "Run:".green(), manifest.run_tag);
    println!("  Base commit: {}", manifest.base_commit);
    println!("  Created at:  {}", manifest.created_at.to_rfc3339());
    println!("  Command:     {}", manifest.cli_command.join(" "));
    print_attempts(&manifest);
    Ok(())
}

fn handle_list_command(orchestrator: &Orchestrator<GitCli>, start_dir: &Path, runs_dir: &Path) -> Result<()> {
    let runs = orchestrator.list_runs(start_dir, runs_dir)?;
    if runs.is_empty() {
        println!("{}", "No runs found".yellow());
        return Ok(());
    }

    for run in &runs {
        match &run.manifest {
            Some(manifest) => println!(
                "{} {} ({} attempt(s), base {}, created {})",
                "complete  ".green(),
                run.run_tag,
                manifest.attempt_count,
                manifest.base_commit,
                manifest.created_at.to_rfc3339()
            ),
            None => println!("{} {} ({})", "incomplete".red(), run.run_tag, run.run_directory.display()),
        }
    }
    Ok(())
}

fn handle_clean_command(
    orchestrator: &Orchestrator<GitCli>,
    run_tag: &str,
    keep_branches: bool,
    start_dir: &Path,
    runs_dir: &Path,
) -> Result<()> {
    let report = orchestrator.clean(start_dir, runs_dir, run_tag, keep_branches)?;
    println!(
        "{} {} ({} worktree(s), {} branch(es) removed)",
        "Cleaned:".green(),
        report.run_directory.display(),
        report.worktrees_removed.len(),
        report.branches_deleted.len()
    );
    Ok(())
}

fn print_attempts(manifest: &RunManifest) {
    println!("\nAttempts:");
    for attempt in &manifest.attempts {
        println!(
            " - {}: {} (branch {})",
            attempt.name,
            attempt.worktree_path.display(),
            attempt.branch
        );
    }
}

fn try_main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging before loading settings so settings loading can log
    let source = setup_logging(&cli)?;

    let settings = Settings::load(cli.settings.as_ref()).context("Failed to load settings")?;
    if matches!(source, LevelSource::Default)
        && let Some(level) = settings.log_level.as_deref()
    {
        log::set_max_level(parse_level(level)?);
    }

    debug!("Starting with settings from: {:?}", cli.settings.as_ref().map(PathBuf::as_path));

    run_application(&cli, &settings)
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
