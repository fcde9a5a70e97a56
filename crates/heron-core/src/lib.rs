//! Shared data model for heron.
//!
//! Both pipelines (type checking and bundling) consume the same input, a
//! [`Snapshot`] of project files, and produce the same output shape, a
//! [`CompileReport`].

mod report;
mod snapshot;

pub use report::CompileReport;
pub use snapshot::{Snapshot, SnapshotError};
