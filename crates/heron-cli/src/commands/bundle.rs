//! Bundle command - compile a snapshot into one ESM module.

use anyhow::Result;
use clap::Args;
use heron_bundle::BundleOptions;
use heron_core::CompileReport;

use crate::request;

#[derive(Args)]
pub struct BundleCommand {}

impl BundleCommand {
    pub fn run(&self) -> Result<()> {
        let report = self.execute();
        super::emit(&report)
    }

    fn execute(&self) -> CompileReport {
        let request = match request::read_from_stdin() {
            Ok(request) => request,
            Err(err) => return CompileReport::failure(format!("invalid request: {err:#}")),
        };
        tracing::debug!(files = request.files.len(), "bundle request received");

        let options = BundleOptions { env: request.env };
        match heron_bundle::bundle(&request.files, &options) {
            Ok(output) => CompileReport::success(output.code).with_externals(output.externals),
            Err(err) => CompileReport::failure(err.to_string()),
        }
    }
}
