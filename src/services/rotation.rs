use crate::config::{ConfigStore, StoreError, clean_entry};
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Advisory shown when there is nothing to rotate through.
pub const SINGLE_DESTINATION_ADVISORY: &str =
    "There is only one destination. You should consider adding more.";

/// Errors advancing the rotation
#[derive(Error, Debug)]
pub enum RotationError {
    #[error("No backup destinations configured")]
    Empty,

    #[error(transparent)]
    Persist(#[from] StoreError),
}

/// The ordered destination list and the file it lives in.
///
/// The head of the list is the current destination. After a successful
/// backup the head moves to the tail so the next run targets the following
/// destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    path: Utf8PathBuf,
    destinations: Vec<String>,
}

impl Rotation {
    pub fn new(path: impl Into<Utf8PathBuf>, destinations: Vec<String>) -> Self {
        Self {
            path: path.into(),
            destinations,
        }
    }

    /// Read the rotations file. A missing file gives an empty rotation.
    pub fn load(store: &ConfigStore, path: &Utf8Path) -> Result<Self, StoreError> {
        let destinations = store.load(path)?;
        Ok(Self::new(path, destinations))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// The current destination, cleaned for use as a sync argument.
    pub fn current(&self) -> Option<&str> {
        self.destinations.first().map(|d| clean_entry(d))
    }

    /// Advisory text when exactly one destination is configured.
    pub fn warn_if_single(&self) -> Option<&'static str> {
        (self.destinations.len() == 1).then_some(SINGLE_DESTINATION_ADVISORY)
    }

    /// Move the head to the tail.
    pub fn advance(&mut self) -> Result<(), RotationError> {
        if self.destinations.is_empty() {
            return Err(RotationError::Empty);
        }

        self.destinations.rotate_left(1);
        tracing::debug!("Rotation advanced, new head: {}", self.destinations[0]);
        Ok(())
    }

    /// Advance and write the new order back to the rotations file.
    ///
    /// If the write fails the in-memory order stays advanced; the next run
    /// reads the old order from disk.
    pub fn advance_and_persist(&mut self, store: &ConfigStore) -> Result<(), RotationError> {
        self.advance()?;
        store.save(&self.path, &self.destinations)?;
        Ok(())
    }
}
