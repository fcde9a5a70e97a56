//! Structured bundler diagnostics and their outward text form.

/// One bundler diagnostic: a parse or resolution problem at a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDiagnostic {
    /// Snapshot path of the file the diagnostic refers to.
    pub file: String,
    /// 1-indexed line, 0 when unknown.
    pub line: usize,
    /// 1-indexed column, 0 when unknown.
    pub column: usize,
    pub message: String,
}

impl BundleDiagnostic {
    /// A diagnostic with no useful position.
    pub fn file_level(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: 0,
            column: 0,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BundleDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}: {}", self.file, self.message)
        } else {
            write!(f, "{}:{}:{}: {}", self.file, self.line, self.column, self.message)
        }
    }
}

/// Reformat diagnostics into one human-readable multi-line string, one
/// paragraph per diagnostic.
pub fn render(diagnostics: &[BundleDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}
