//! rotabackup - Rotating rsync backup runner
//!
//! Main entry point for the command line application.
//!
//! # Execution Flow
//!
//! 1. Parse arguments; `--help [category]` prints help and exits
//! 2. Resolve the run configuration against the home directory
//! 3. Initialize logging → ~/.config/rotabackup/logs/rotabackup.<date>
//! 4. Create a single-threaded tokio runtime for the sync subprocess
//! 5. Run the backup: preflight, sync to the current destination, rotate on success
//!
//! # Configuration Files
//!
//! Expected in `~/.config/rotabackup/` unless overridden:
//! - `configuration`: Sources, one path per line
//! - `rotations`: Destinations, one path per line, first line is the current one
//!
//! # Exit Status
//!
//! `0` on success, `1` for every kind of failure.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use rotabackup::cli::Cli;
use rotabackup::models::RotationOutcome;
use rotabackup::services::SearchPath;
use rotabackup::{APP_NAME, BackupRunner, RunConfig, VERSION, help, logging, prompt};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Fatal error: {:#}", e);
            eprintln!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            print!("{}", help::with_errors(&[e.to_string()]));
            return Ok(ExitCode::from(1));
        }
    };

    if let Some(category) = &cli.help {
        return Ok(match help::category_help(category) {
            Ok(text) => {
                print!("{}", text);
                ExitCode::SUCCESS
            }
            Err(text) => {
                print!("{}", text);
                ExitCode::from(1)
            }
        });
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let home = Utf8PathBuf::try_from(home).context("Home directory is not valid UTF-8")?;
    let config = RunConfig::resolve(&home, cli.overrides());

    // Logging must never stop a backup; fall back to stderr only. The config
    // directory itself is never created here, preflight reports it missing.
    let _guard = match logging::setup_logging_with_console(
        &config.log_dir,
        APP_NAME,
        cli.verbose,
        cli.verbose,
    ) {
        Ok(guard) => Some(guard),
        Err(e) => {
            logging::setup_console_logging(cli.verbose)?;
            tracing::warn!("File logging unavailable: {:#}", e);
            None
        }
    };

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    // One child process at a time, no need for worker threads
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let confirmer = prompt::default_confirmer();
    let mut runner = BackupRunner::new(
        config,
        &SearchPath,
        confirmer.as_ref(),
        tokio::io::stdout(),
    );

    match runtime.block_on(runner.run()) {
        Ok(outcome) => {
            match &outcome.rotation {
                RotationOutcome::Rotated { next } => {
                    tracing::info!("Backup to {} complete, next: {}", outcome.destination, next)
                }
                RotationOutcome::SingleDestination => {
                    tracing::info!("Backup to {} complete", outcome.destination)
                }
                RotationOutcome::PersistFailed { reason } => tracing::warn!(
                    "Backup to {} complete but rotation was not saved: {}",
                    outcome.destination,
                    reason
                ),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(ExitCode::from(e.exit_code())),
    }
}
