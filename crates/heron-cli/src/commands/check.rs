//! Check command - type check a snapshot in an ephemeral workspace.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use heron_check::{CheckConfig, TscProvider, check_snapshot};
use heron_core::CompileReport;

use crate::request;

#[derive(Args)]
pub struct CheckCommand {
    /// Directory of shared type declarations, linked into the workspace as
    /// node_modules
    #[arg(long, value_name = "DIR")]
    pub types_dir: Option<PathBuf>,

    /// Path to the tsc binary (default: located on PATH)
    #[arg(long, value_name = "PATH")]
    pub tsc: Option<PathBuf>,
}

impl CheckCommand {
    pub async fn run(&self) -> Result<()> {
        let report = self.execute().await;
        super::emit(&report)
    }

    async fn execute(&self) -> CompileReport {
        let request = match request::read_from_stdin() {
            Ok(request) => request,
            Err(err) => return CompileReport::failure(format!("invalid request: {err:#}")),
        };
        tracing::debug!(files = request.files.len(), "check request received");

        let provider = match &self.tsc {
            Some(path) => TscProvider::with_binary(path),
            None => match TscProvider::locate() {
                Ok(provider) => provider,
                Err(err) => return CompileReport::failure(err.to_string()),
            },
        };

        let config = CheckConfig {
            shared_types_dir: self.types_dir.clone(),
        };

        match check_snapshot(&provider, &request.files, &config).await {
            Ok(report) => report,
            Err(err) => CompileReport::failure(err.to_string()),
        }
    }
}
