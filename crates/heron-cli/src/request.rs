//! Request payload shared by the subcommands.

use std::collections::BTreeMap;
use std::io::Read;

use anyhow::{Context, Result};
use heron_core::Snapshot;
use serde::Deserialize;

/// One validation request: the snapshot plus optional bundle-time values.
#[derive(Debug, Deserialize)]
pub struct Request {
    /// Path→content map of the snapshot.
    pub files: Snapshot,

    /// Values exposed to app code through `process.env`. Ignored by `check`.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Read and parse the request from stdin.
pub fn read_from_stdin() -> Result<Request> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading request from stdin")?;
    serde_json::from_str(&buf).context("parsing request JSON")
}
