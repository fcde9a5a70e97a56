//! Best-effort parsing of toolchain diagnostics.
//!
//! tsc output is line-oriented text, not a formal schema. Each diagnostic
//! line has the shape `path(line,col): error TSnnnn: message`; anything that
//! does not match is ignored. The untruncated raw text stays available in the
//! report for consumers that need full fidelity.

use regex::Regex;
use std::sync::OnceLock;

/// One parsed diagnostic from the type checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Virtual file path as reported (workspace-relative or redacted).
    pub file: String,
    /// 1-indexed line.
    pub line: u32,
    /// 1-indexed column.
    pub column: u32,
    /// TypeScript error code, e.g. "TS2322".
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({},{}): error {}: {}",
            self.file, self.line, self.column, self.code, self.message
        )
    }
}

fn diagnostic_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\): error (?P<code>TS\d+): (?P<msg>.*)$")
            .expect("diagnostic pattern is valid")
    })
}

/// Extract structured diagnostics from normalized toolchain text.
pub fn parse(text: &str) -> Vec<Diagnostic> {
    text.lines()
        .filter_map(|line| {
            let caps = diagnostic_line().captures(line.trim_end())?;
            Some(Diagnostic {
                file: caps["file"].to_string(),
                line: caps["line"].parse().ok()?,
                column: caps["col"].parse().ok()?,
                code: caps["code"].to_string(),
                message: caps["msg"].to_string(),
            })
        })
        .collect()
}

/// Count of parseable error lines in the text.
pub fn error_count(text: &str) -> usize {
    parse(text).len()
}
