//! Heron CLI - validate and bundle generated web-app snapshots.
//!
//! Both subcommands speak the same protocol: a JSON request on stdin, one
//! JSON report line on stdout. Every outcome, including bad input and
//! toolchain failures, is delivered as a report; logs go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

mod commands;
mod request;

#[derive(Parser)]
#[command(
    name = "heron",
    version,
    about = "Validate and bundle generated web-app snapshots",
    long_about = "Reads a JSON request ({\"files\": {path: content, ...}, \"env\": {...}})\n\
                  from stdin and writes a single-line JSON report to stdout.\n\n\
                  Type check:  heron check < request.json\n\
                  Bundle:      heron bundle < request.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Type check a snapshot with the external TypeScript compiler
    Check(commands::check::CheckCommand),

    /// Bundle a snapshot into a single ESM module
    Bundle(commands::bundle::BundleCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check(cmd) => cmd.run().await,
        Commands::Bundle(cmd) => cmd.run(),
    }
}
