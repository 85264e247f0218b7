use crate::models::RunConfig;
use crate::prompt::Confirmer;
use camino::{Utf8Path, Utf8PathBuf};
use std::path::PathBuf;
use thiserror::Error;

/// A reason the run cannot start.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreflightFailure {
    #[error(
        "This program needs the following programs to function properly:\n - {0}\n\nPlease, make sure you have installed these programs and try again."
    )]
    ToolMissing(String),

    #[error("Configuration file does not exist or is not a file: {0}")]
    ConfigurationMissing(Utf8PathBuf),

    #[error("Rotations file does not exist or is not a file: {0}")]
    RotationsMissing(Utf8PathBuf),

    #[error("Error log file is a directory: {0}")]
    ErrorLogIsDirectory(Utf8PathBuf),

    #[error("Error log directory does not exist: {0}")]
    ErrorLogDirectoryMissing(Utf8PathBuf),

    #[error("Error log file already exists: {0}")]
    ErrorLogExists(Utf8PathBuf),
}

/// Finds executables.
pub trait ToolResolver {
    fn resolve(&self, name: &str) -> Option<PathBuf>;
}

/// Looks executables up on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchPath;

impl ToolResolver for SearchPath {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        match which::which(name) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!("Could not resolve {}: {}", name, e);
                None
            }
        }
    }
}

impl<F> ToolResolver for F
where
    F: Fn(&str) -> Option<PathBuf>,
{
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        self(name)
    }
}

/// Outcome of the preflight checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    /// Resolved sync engine, if found
    pub tool_path: Option<PathBuf>,

    /// Every failed check, in the order checked
    pub failures: Vec<PreflightFailure>,
}

impl PreflightReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The gate run before anything is spawned or overwritten.
///
/// All checks are always evaluated so that the operator sees every problem
/// at once.
pub struct Preflight<'a> {
    resolver: &'a dyn ToolResolver,
    confirmer: &'a dyn Confirmer,
}

impl<'a> Preflight<'a> {
    pub fn new(resolver: &'a dyn ToolResolver, confirmer: &'a dyn Confirmer) -> Self {
        Self {
            resolver,
            confirmer,
        }
    }

    pub fn check(&self, config: &RunConfig) -> PreflightReport {
        let mut failures = Vec::new();

        let tool_path = self.resolver.resolve(&config.sync_tool);
        match &tool_path {
            Some(path) => tracing::debug!("Sync tool resolved to {}", path.display()),
            None => failures.push(PreflightFailure::ToolMissing(config.sync_tool.clone())),
        }

        if !config.configuration.is_file() {
            failures.push(PreflightFailure::ConfigurationMissing(
                config.configuration.clone(),
            ));
        }

        if !config.rotations.is_file() {
            failures.push(PreflightFailure::RotationsMissing(config.rotations.clone()));
        }

        if let Some(errorlog) = &config.errorlog {
            if let Some(failure) = self.check_errorlog(errorlog) {
                failures.push(failure);
            }
        }

        for failure in &failures {
            tracing::warn!("Preflight check failed: {}", failure);
        }

        PreflightReport {
            tool_path,
            failures,
        }
    }

    fn check_errorlog(&self, errorlog: &Utf8Path) -> Option<PreflightFailure> {
        if errorlog.is_dir() {
            return Some(PreflightFailure::ErrorLogIsDirectory(errorlog.to_path_buf()));
        }

        if errorlog.is_file() {
            let prompt = format!(
                "Error log file {} already exists. Do you want to overwrite it?",
                errorlog
            );
            if self.confirmer.ask(&prompt) {
                tracing::info!("Operator agreed to overwrite {}", errorlog);
                return None;
            }
            return Some(PreflightFailure::ErrorLogExists(errorlog.to_path_buf()));
        }

        // A bare file name has an empty parent, meaning the working directory
        match errorlog.parent() {
            Some(parent) if !parent.as_str().is_empty() && !parent.is_dir() => Some(
                PreflightFailure::ErrorLogDirectoryMissing(parent.to_path_buf()),
            ),
            _ => None,
        }
    }
}
