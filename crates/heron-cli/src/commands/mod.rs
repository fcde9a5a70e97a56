//! CLI subcommands.

use std::io::Write;

use anyhow::{Context, Result};
use heron_core::CompileReport;

pub mod bundle;
pub mod check;

/// Write the report as one JSON line on stdout. This is the only fallible
/// step that escapes the report protocol.
pub fn emit(report: &CompileReport) -> Result<()> {
    let line = serde_json::to_string(report).context("serializing report")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}").context("writing report to stdout")?;
    Ok(())
}
