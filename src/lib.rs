// rotabackup - Rotating rsync backup runner
//
// This is the library crate containing the rotation state machine, the
// preflight gate and the sync process plumbing. The binary crate (main.rs)
// provides the command line entry point.

pub mod cli;
pub mod config;
pub mod help;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod runner;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigStore;
pub use models::{PathOverrides, RunConfig, RunOutcome, RunPhase};
pub use runner::{BackupRunner, RunError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
