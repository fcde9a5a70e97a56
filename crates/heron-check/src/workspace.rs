//! Ephemeral workspace materialization.
//!
//! Each type-check invocation gets a uniquely-named temporary directory that
//! is exclusively owned by that invocation and removed unconditionally when
//! the [`Workspace`] is dropped, including on panic paths.

use heron_core::Snapshot;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;

use crate::tsconfig;

/// Errors raised while materializing a snapshot onto disk.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("failed to create ephemeral workspace: {0}")]
    Create(#[source] io::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write project configuration: {0}")]
    Config(#[source] io::Error),
}

/// A short-lived directory holding one materialized snapshot plus its
/// synthesized `tsconfig.json` and (optionally) linked type declarations.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Materialize every snapshot file under a fresh temporary directory,
    /// creating intermediate directories as needed, then write the
    /// synthesized project configuration.
    ///
    /// `shared_types_dir`, when given, is linked into the workspace as
    /// `node_modules` so snapshots need not carry dependency type stubs.
    /// Link failure is non-fatal.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when the directory cannot be created or a
    /// file cannot be written. The partially-built workspace is removed.
    pub fn materialize(
        snapshot: &Snapshot,
        shared_types_dir: Option<&Path>,
    ) -> Result<Self, WorkspaceError> {
        let dir = tempfile::Builder::new()
            .prefix("heron-check-")
            .tempdir()
            .map_err(WorkspaceError::Create)?;

        for (path, content) in snapshot.files() {
            let dest = dir.path().join(path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|source| WorkspaceError::Write {
                    path: path.to_string(),
                    source,
                })?;
            }
            fs::write(&dest, content).map_err(|source| WorkspaceError::Write {
                path: path.to_string(),
                source,
            })?;
        }

        let config = tsconfig::synthesize();
        let config_text = serde_json::to_string_pretty(&config)
            .map_err(|err| WorkspaceError::Config(io::Error::other(err)))?;
        fs::write(dir.path().join("tsconfig.json"), config_text)
            .map_err(WorkspaceError::Config)?;

        if let Some(types_dir) = shared_types_dir {
            link_types(dir.path(), types_dir);
        }

        tracing::debug!(root = %dir.path().display(), files = snapshot.len(), "workspace materialized");

        Ok(Self { dir })
    }

    /// Absolute root of the materialized workspace.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the workspace now rather than on drop, logging (but not
    /// propagating) removal failures.
    pub fn close(self) {
        let root: PathBuf = self.dir.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            tracing::warn!(root = %root.display(), %err, "failed to remove ephemeral workspace");
        }
    }
}

/// Link the shared read-only type declarations into the workspace as
/// `node_modules`. The shared directory is safe to link from any number of
/// concurrent workspaces. Failures (including an existing entry) are ignored.
fn link_types(root: &Path, types_dir: &Path) {
    let dest = root.join("node_modules");

    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(types_dir, &dest);
    #[cfg(windows)]
    let result = std::os::windows::fs::symlink_dir(types_dir, &dest);

    if let Err(err) = result {
        tracing::debug!(%err, "skipping shared type declarations link");
    }
}
