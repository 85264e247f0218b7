//! The backup run state machine.
//!
//! [`BackupRunner`] drives one run through
//! `Idle -> Validating -> AwaitingDestination -> Syncing -> Succeeded | Failed`.
//! The destination list is rotated only after the sync engine exits cleanly,
//! and at most once per run.

use crate::config::{ConfigStore, StoreError};
use crate::help;
use crate::models::{RotationOutcome, RunConfig, RunOutcome, RunPhase};
use crate::prompt::Confirmer;
use crate::services::{
    Preflight, PreflightFailure, Rotation, SyncCommand, SyncError, SyncService, ToolResolver,
};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Why a run did not succeed.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Preflight checks failed ({} problems)", .0.len())]
    Preflight(Vec<PreflightFailure>),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No backup sources found.")]
    NoSources,

    #[error("No backup destinations found.")]
    NoDestinations,

    #[error("Destination directory '{0}' does not exist.")]
    DestinationMissing(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Sync process failed with exit code {0:?}")]
    SyncFailed(Option<i32>),

    #[error("Backup interrupted")]
    Interrupted,

    #[error("Console output failed: {0}")]
    Console(#[from] io::Error),
}

impl RunError {
    /// Process exit status. Every failure category shares status 1.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// What the operator is told before the process exits.
    fn operator_message(&self) -> String {
        match self {
            RunError::Preflight(failures) => {
                let reasons: Vec<String> = failures.iter().map(ToString::to_string).collect();
                help::with_errors(&reasons)
            }
            RunError::DestinationMissing(_) => format!(
                "{}\nMaybe you have connected the wrong device or the device is not mounted.\nExiting...\n",
                self
            ),
            RunError::SyncFailed(_) => {
                "An error occurred during the backup.\nExiting...\n".to_string()
            }
            RunError::Interrupted => {
                "The backup was interrupted. Destinations were not rotated.\nExiting...\n"
                    .to_string()
            }
            _ => format!("{}\nExiting...\n", self),
        }
    }
}

/// Runs one backup against the current destination.
pub struct BackupRunner<'a, W> {
    config: RunConfig,
    resolver: &'a dyn ToolResolver,
    confirmer: &'a dyn Confirmer,
    store: ConfigStore,
    sync: SyncService,
    console: W,
    phase: RunPhase,
    history: Vec<RunPhase>,
}

impl<'a, W> BackupRunner<'a, W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(
        config: RunConfig,
        resolver: &'a dyn ToolResolver,
        confirmer: &'a dyn Confirmer,
        console: W,
    ) -> Self {
        Self {
            config,
            resolver,
            confirmer,
            store: ConfigStore::new(),
            sync: SyncService::new(),
            console,
            phase: RunPhase::Idle,
            history: vec![RunPhase::Idle],
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Every phase entered so far, starting with `Idle`.
    pub fn history(&self) -> &[RunPhase] {
        &self.history
    }

    pub fn console(&self) -> &W {
        &self.console
    }

    /// Execute the run. On failure the operator message has already been printed.
    pub async fn run(&mut self) -> Result<RunOutcome, RunError> {
        match self.drive().await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::error!("Backup failed in phase {}: {}", self.phase, err);
                self.transition(RunPhase::Failed);

                let message = err.operator_message();
                if let Err(e) = self.write(&message).await {
                    tracing::warn!("Could not print failure message: {}", e);
                }
                Err(err)
            }
        }
    }

    async fn drive(&mut self) -> Result<RunOutcome, RunError> {
        self.transition(RunPhase::Validating);
        let tool_path = self.validate()?;

        self.transition(RunPhase::AwaitingDestination);
        let sources = self.store.load(&self.config.configuration)?;
        if sources.is_empty() {
            return Err(RunError::NoSources);
        }

        let mut rotation = Rotation::load(&self.store, &self.config.rotations)?;
        let destination = rotation
            .current()
            .ok_or(RunError::NoDestinations)?
            .to_string();

        if let Some(advisory) = rotation.warn_if_single() {
            tracing::warn!("{}", advisory);
            self.write(&format!("{}\n\n", advisory)).await?;
        }

        if !Path::new(&destination).exists() {
            return Err(RunError::DestinationMissing(destination));
        }

        let command = SyncCommand::build(
            tool_path,
            &self.config.sync_args,
            &sources,
            &destination,
        );

        self.transition(RunPhase::Syncing);
        tracing::info!(
            "Backing up {} sources to {} ({} destinations in rotation)",
            sources.len(),
            destination,
            rotation.len()
        );

        let report = self
            .sync
            .execute(&command, &mut self.console, self.config.errorlog.as_deref())
            .await?;
        self.write("\n").await?;

        if report.interrupted {
            return Err(RunError::Interrupted);
        }
        if !report.succeeded() {
            return Err(RunError::SyncFailed(report.exit_code));
        }

        self.transition(RunPhase::Succeeded);
        let rotation_outcome = self.rotate(&mut rotation).await;

        Ok(RunOutcome {
            destination,
            sync: report,
            rotation: rotation_outcome,
        })
    }

    fn validate(&self) -> Result<PathBuf, RunError> {
        let report = Preflight::new(self.resolver, self.confirmer).check(&self.config);

        match report.tool_path {
            Some(path) if report.failures.is_empty() => Ok(path),
            _ => Err(RunError::Preflight(report.failures)),
        }
    }

    /// Rotate after a successful sync. Never fails the run.
    async fn rotate(&mut self, rotation: &mut Rotation) -> RotationOutcome {
        if rotation.len() <= 1 {
            self.announce("Backup successful. Consider adding more destinations.")
                .await;
            return RotationOutcome::SingleDestination;
        }

        self.announce("Backup successful. Rotating backup destinations...")
            .await;

        match rotation.advance_and_persist(&self.store) {
            Ok(()) => {
                let next = rotation.current().unwrap_or_default().to_string();
                tracing::info!("Next backup destination: {}", next);
                RotationOutcome::Rotated { next }
            }
            Err(e) => {
                tracing::error!(
                    "Backup succeeded but the rotation could not be saved to {}: {}",
                    rotation.path(),
                    e
                );
                self.announce("Error writing the rotations file").await;
                RotationOutcome::PersistFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn transition(&mut self, next: RunPhase) {
        if !self.phase.can_transition_to(next) {
            tracing::error!("Ignoring invalid phase transition {} -> {}", self.phase, next);
            return;
        }

        tracing::debug!("Run phase: {} -> {}", self.phase, next);
        self.phase = next;
        self.history.push(next);
    }

    async fn write(&mut self, text: &str) -> io::Result<()> {
        self.console.write_all(text.as_bytes()).await?;
        self.console.flush().await
    }

    /// Print a line after the backup has already succeeded.
    async fn announce(&mut self, line: &str) {
        if let Err(e) = self.write(&format!("{}\n", line)).await {
            tracing::warn!("Could not print '{}': {}", line, e);
        }
    }
}
