//! In-memory project snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors produced when validating a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot contains no files")]
    Empty,

    #[error("snapshot contains an empty file path")]
    EmptyPath,

    #[error("snapshot path is not relative: {0}")]
    AbsolutePath(String),

    #[error("snapshot path escapes the project root: {0}")]
    PathTraversal(String),
}

/// An in-memory mapping of relative file paths to their full text content,
/// representing one deployable unit.
///
/// Paths are forward-slash separated and may describe nested directories that
/// do not exist anywhere on disk. Insertion order is irrelevant; the map is
/// kept sorted for deterministic iteration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    files: BTreeMap<String, String>,
}

impl Snapshot {
    /// Create a snapshot from a path-to-content map.
    pub fn from_files(files: BTreeMap<String, String>) -> Self {
        Self { files }
    }

    /// Iterate over `(path, content)` pairs in sorted path order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// Look up a file by its exact relative path.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Whether the snapshot contains the exact path.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Validate the snapshot invariants: non-empty, and every path is a
    /// non-empty relative path that stays inside the project root.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.files.is_empty() {
            return Err(SnapshotError::Empty);
        }

        for path in self.files.keys() {
            if path.is_empty() {
                return Err(SnapshotError::EmptyPath);
            }
            if path.starts_with('/') || path.contains(':') {
                return Err(SnapshotError::AbsolutePath(path.clone()));
            }
            if path.split('/').any(|segment| segment == "..") {
                return Err(SnapshotError::PathTraversal(path.clone()));
            }
        }

        Ok(())
    }
}

impl FromIterator<(String, String)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}
