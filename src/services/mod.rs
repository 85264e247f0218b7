//! Services module - the building blocks of a backup run.
//!
//! None of these know about the command line or the run state machine; the
//! [`crate::runner::BackupRunner`] composes them.
//!
//! # Components
//!
//! - [`Preflight`]: Checks that the sync tool, the list files and the optional
//!   error log are usable, collecting every failure instead of stopping at the first
//! - [`Rotation`]: The destination list; picks the head and rotates it to the tail
//!   after a successful backup
//! - [`SyncService`]: Spawns the sync engine with an argument array and relays its
//!   stderr to the console as it is produced
//!
//! # Usage Example
//!
//! ```ignore
//! use rotabackup::services::{SyncCommand, SyncService};
//!
//! let command = SyncCommand::build("rsync", &base_args, &sources, "/mnt/d1");
//! let report = SyncService::new()
//!     .execute(&command, &mut tokio::io::stdout(), None)
//!     .await?;
//! if report.succeeded() {
//!     rotation.advance_and_persist(&store)?;
//! }
//! ```

pub mod preflight;
pub mod rotation;
pub mod sync;

pub use preflight::{Preflight, PreflightFailure, PreflightReport, SearchPath, ToolResolver};
pub use rotation::{Rotation, RotationError, SINGLE_DESTINATION_ADVISORY};
pub use sync::{SyncCommand, SyncError, SyncService};
