//! End-to-end type-check pipeline.
//!
//! Materialize, invoke, normalize, clean up. The ephemeral workspace is a
//! scoped resource: it is acquired on entry and released on every exit path,
//! including provider failures and panics, so concurrent invocations never
//! accumulate state on disk.

use heron_core::{CompileReport, Snapshot, SnapshotError};
use std::path::PathBuf;
use thiserror::Error;

use crate::normalize;
use crate::provider::{CheckProvider, ToolchainError};
use crate::workspace::{Workspace, WorkspaceError};

/// Message returned when the toolchain reports a clean run.
pub const NO_ERRORS_MESSAGE: &str = "No errors found.";

/// Configuration for one type-check invocation.
#[derive(Debug, Clone, Default)]
pub struct CheckConfig {
    /// Directory of shared type declarations linked into each workspace as
    /// `node_modules`. Read-only, safely shared across concurrent checks.
    pub shared_types_dir: Option<PathBuf>,
}

/// Failures that prevent a check from producing diagnostics at all.
///
/// A snapshot that type-checks with errors is not among these; that outcome
/// is an ordinary `success: false` report.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Malformed or absent request payload.
    #[error("invalid input: {0}")]
    Input(#[from] SnapshotError),

    /// Workspace creation or write failure, fatal for this request only.
    #[error("filesystem error: {0}")]
    Filesystem(#[from] WorkspaceError),

    /// The external type checker could not be executed.
    #[error("toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),
}

/// Type-check a snapshot in a fresh ephemeral workspace.
///
/// Returns `Ok` with a success report when the toolchain exits cleanly, or a
/// failure report carrying normalized, length-capped diagnostics (plus the
/// untruncated text in `raw`) when it does not.
///
/// # Errors
///
/// Returns [`CheckError`] for invalid snapshots, workspace materialization
/// failures, and toolchain spawn failures. The workspace is removed in every
/// case.
pub async fn check_snapshot<P: CheckProvider>(
    provider: &P,
    snapshot: &Snapshot,
    config: &CheckConfig,
) -> Result<CompileReport, CheckError> {
    snapshot.validate()?;

    let workspace = Workspace::materialize(snapshot, config.shared_types_dir.as_deref())?;

    // The workspace guards its directory; any early return below (including
    // the ? on the provider) drops it and removes the tree.
    let output = provider.check(workspace.root()).await?;

    let normalized = normalize::normalize(&output.combined(), workspace.root());
    workspace.close();

    if output.is_clean() {
        tracing::debug!("type check passed");
        return Ok(CompileReport::success(NO_ERRORS_MESSAGE));
    }

    tracing::debug!(
        errors = crate::diagnostics::error_count(&normalized),
        "type check reported diagnostics"
    );

    Ok(CompileReport::failure_with_raw(
        normalize::truncate(&normalized),
        normalized,
    ))
}
