//! Type-check pipeline for project snapshots.
//!
//! A snapshot is materialized into a uniquely-named ephemeral workspace, a
//! project configuration is synthesized next to it, an external type-checking
//! toolchain runs against the workspace as a subprocess, and its text output
//! is normalized into a bounded, path-redacted [`CompileReport`].
//!
//! The workspace is destroyed on every exit path; nothing persists between
//! invocations.

pub mod diagnostics;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod tsc;
pub mod tsconfig;
pub mod workspace;

pub use heron_core::CompileReport;
pub use pipeline::{check_snapshot, CheckConfig, CheckError};
pub use provider::{CheckProvider, ToolOutput, ToolchainError};
pub use tsc::TscProvider;
