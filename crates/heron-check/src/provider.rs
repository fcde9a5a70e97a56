//! Pluggable type-check provider.
//!
//! The pipeline only needs one capability from a toolchain: run against a
//! workspace root and hand back exit status plus captured output. Abstracting
//! it behind a trait lets an embedded checker replace the subprocess
//! implementation, and lets tests script toolchain behavior without a real
//! binary on the machine.

use std::io;
use std::path::Path;
use thiserror::Error;

/// The captured result of one toolchain run.
///
/// A non-zero exit status is not a system error; it means diagnostics were
/// produced and must be normalized.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    /// Captured standard output, bounded by the provider.
    pub stdout: String,
    /// Captured standard error, bounded by the provider.
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the toolchain reported a clean run.
    pub fn is_clean(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout and stderr joined in report order.
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// The toolchain itself could not run (distinct from the toolchain running
/// and reporting diagnostics).
#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("type checker binary not found: {0}")]
    NotFound(String),

    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to capture type checker output: {0}")]
    Capture(#[source] io::Error),
}

/// Runs a type-checking toolchain against a materialized workspace.
pub trait CheckProvider: Send + Sync {
    /// Run the toolchain rooted at `workspace_root` and capture its output.
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError`] only when the toolchain could not be
    /// executed at all.
    fn check(
        &self,
        workspace_root: &Path,
    ) -> impl Future<Output = Result<ToolOutput, ToolchainError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_orders_stdout_first() {
        let output = ToolOutput {
            exit_code: Some(2),
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(output.combined(), "out\nerr");
    }

    #[test]
    fn test_is_clean_requires_zero_exit() {
        let clean = ToolOutput {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(clean.is_clean());

        let killed = ToolOutput {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(!killed.is_clean());
    }
}
