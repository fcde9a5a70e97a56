//! Subprocess provider backed by the TypeScript compiler.
//!
//! Runs `tsc --noEmit` scoped to a workspace root and captures its output
//! with a hard buffering cap, so pathological input cannot grow memory
//! without bound. No timeout is enforced on the subprocess.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::provider::{CheckProvider, ToolOutput, ToolchainError};

/// Hard cap on captured bytes per stream (5 MiB).
pub const MAX_CAPTURE_BYTES: u64 = 5 * 1024 * 1024;

/// [`CheckProvider`] implementation that shells out to `tsc`.
#[derive(Debug, Clone)]
pub struct TscProvider {
    binary: PathBuf,
}

impl TscProvider {
    /// Locate `tsc` on the search path.
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError::NotFound`] when no `tsc` binary is
    /// installed.
    pub fn locate() -> Result<Self, ToolchainError> {
        let binary =
            which::which("tsc").map_err(|err| ToolchainError::NotFound(err.to_string()))?;
        tracing::debug!(binary = %binary.display(), "located tsc");
        Ok(Self { binary })
    }

    /// Use an explicit `tsc` binary path.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path of the binary this provider invokes.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl CheckProvider for TscProvider {
    async fn check(&self, workspace_root: &Path) -> Result<ToolOutput, ToolchainError> {
        let mut child = Command::new(&self.binary)
            .args(["-p", ".", "--noEmit", "--pretty", "false"])
            .current_dir(workspace_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolchainError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout, stderr) = tokio::join!(read_capped(stdout), read_capped(stderr));
        let stdout = stdout.map_err(ToolchainError::Capture)?;
        let stderr = stderr.map_err(ToolchainError::Capture)?;

        let status = child.wait().await.map_err(ToolchainError::Capture)?;

        tracing::debug!(code = ?status.code(), "tsc finished");

        Ok(ToolOutput {
            exit_code: status.code(),
            stdout,
            stderr,
        })
    }
}

/// Read a child stream to completion, discarding anything past the cap.
async fn read_capped<R>(reader: Option<R>) -> std::io::Result<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(String::new());
    };
    let mut buf = Vec::new();
    (&mut reader)
        .take(MAX_CAPTURE_BYTES)
        .read_to_end(&mut buf)
        .await?;
    // Drain whatever remains so the child never blocks on a full pipe.
    tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
