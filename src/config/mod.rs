use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use thiserror::Error;

/// Errors reading or writing a list file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Loads and saves the newline-delimited path lists.
///
/// Both the sources file and the rotations file use the same format: one
/// path per line, surrounding whitespace ignored, blank lines skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load the trimmed, non-empty lines of a list file.
    ///
    /// A missing file is an empty list. Whether that is fatal is up to the caller.
    pub fn load(&self, path: &Utf8Path) -> Result<Vec<String>, StoreError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("List file {} not found, treating as empty", path);
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let entries: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        tracing::debug!("Loaded {} entries from {}", entries.len(), path);
        Ok(entries)
    }

    /// Write the list back, one entry per line.
    pub fn save(&self, path: &Utf8Path, entries: &[String]) -> Result<(), StoreError> {
        let mut contents = String::new();
        for entry in entries {
            contents.push_str(entry);
            contents.push('\n');
        }

        fs::write(path, contents).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Saved {} entries to {}", entries.len(), path);
        Ok(())
    }
}

/// Strip surrounding whitespace and trailing path separators from an entry.
///
/// A path consisting only of separators keeps a single one, so `/` stays `/`.
pub fn clean_entry(entry: &str) -> &str {
    let trimmed = entry.trim();
    let stripped = trimmed.trim_end_matches(std::path::is_separator);

    if stripped.is_empty() && !trimmed.is_empty() {
        &trimmed[..1]
    } else {
        stripped
    }
}
