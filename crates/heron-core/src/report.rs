//! The outward-facing result shape shared by both pipelines.

use serde::{Deserialize, Serialize};

/// Result of a type-check or bundle invocation.
///
/// Exactly one of `output` or `error` is populated depending on `success`.
/// `raw`, when present, carries the untruncated diagnostics for consumers
/// that need full fidelity. `externals` is populated only on bundle success
/// and lists the allowlisted libraries the bundle references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileReport {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub externals: Option<Vec<String>>,
}

impl CompileReport {
    /// A successful invocation carrying its output text.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
            raw: None,
            externals: None,
        }
    }

    /// A failed invocation carrying a diagnostic message only.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            raw: None,
            externals: None,
        }
    }

    /// A failed invocation that retains the untruncated diagnostics.
    pub fn failure_with_raw(error: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            ..Self::failure(error)
        }
    }

    /// Attach the list of external libraries referenced by a bundle.
    pub fn with_externals(mut self, externals: Vec<String>) -> Self {
        self.externals = Some(externals);
        self
    }
}
