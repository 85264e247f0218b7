//! Data models for rotabackup.
//!
//! - [`RunConfig`]: Resolved file locations and sync engine settings for one run
//! - [`PathOverrides`]: Paths given on the command line
//! - [`RunPhase`]: The phases of the run state machine
//! - [`SyncReport`] / [`RunOutcome`]: What a run did, never persisted

pub mod config;
pub mod run_state;

pub use config::{PathOverrides, RunConfig};
pub use run_state::{RotationOutcome, RunOutcome, RunPhase, SyncReport};
