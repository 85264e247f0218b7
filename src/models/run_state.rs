use std::fmt;
use std::time::Duration;

/// Phases of a single backup run.
///
/// ```text
/// Idle -> Validating -> AwaitingDestination -> Syncing -> Succeeded
///            |                 |                  |
///            +-----------------+------------------+---> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Validating,
    AwaitingDestination,
    Syncing,
    Succeeded,
    Failed,
}

impl RunPhase {
    /// True for `Succeeded` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Succeeded | RunPhase::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: RunPhase) -> bool {
        use RunPhase::*;

        match (self, next) {
            (Idle, Validating) => true,
            (Validating, AwaitingDestination) => true,
            (AwaitingDestination, Syncing) => true,
            (Syncing, Succeeded) => true,
            (Validating | AwaitingDestination | Syncing, Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Validating => "validating",
            RunPhase::AwaitingDestination => "awaiting destination",
            RunPhase::Syncing => "syncing",
            RunPhase::Succeeded => "succeeded",
            RunPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the sync process did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,

    /// The operator pressed Ctrl-C while the process was running
    pub interrupted: bool,

    /// Bytes of stderr echoed to the console
    pub bytes_streamed: u64,

    pub duration: Duration,
}

impl SyncReport {
    /// Only a clean exit without an interrupt allows rotation.
    pub fn succeeded(&self) -> bool {
        !self.interrupted && self.exit_code == Some(0)
    }
}

/// What happened to the destination list after a successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// Head moved to the tail and written back; `next` is the new head
    Rotated { next: String },

    /// Only one destination configured, nothing written
    SingleDestination,

    /// Rotated in memory but the rotations file could not be written
    PersistFailed { reason: String },
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub destination: String,
    pub sync: SyncReport,
    pub rotation: RotationOutcome,
}
