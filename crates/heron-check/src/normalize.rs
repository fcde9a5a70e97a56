//! Diagnostic output normalization.
//!
//! Raw toolchain output references the ephemeral workspace by absolute path.
//! Before a report leaves the pipeline, every occurrence of that prefix is
//! rewritten to a stable virtual marker so diagnostics are deterministic and
//! never leak local filesystem layout. Blank lines are dropped, and the final
//! error text is capped at a fixed character limit.

use std::path::Path;

/// Stable marker substituted for the real workspace root in diagnostics.
pub const VIRTUAL_ROOT: &str = "/app";

/// Character cap applied to outward-facing error text.
pub const OUTPUT_CHAR_CAP: usize = 2000;

/// Appended whenever the cap truncates diagnostics.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Redact the workspace prefix and strip blank lines.
///
/// Both the literal root and its canonicalized form are replaced; on some
/// platforms the temp directory reported by the toolchain differs from the
/// path we created (symlinked `/tmp`, `/private` on macOS).
pub fn normalize(raw: &str, workspace_root: &Path) -> String {
    let mut prefixes = vec![workspace_root.to_string_lossy().into_owned()];
    if let Ok(canonical) = workspace_root.canonicalize() {
        let canonical = canonical.to_string_lossy().into_owned();
        if !prefixes.contains(&canonical) {
            prefixes.push(canonical);
        }
    }

    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut line = line.to_string();
            for prefix in &prefixes {
                // Replace the prefix with and without a trailing separator so
                // "/tmp/ws/src/a.ts" becomes "/app/src/a.ts", not "/app//...".
                line = line.replace(&format!("{prefix}/"), &format!("{VIRTUAL_ROOT}/"));
                line = line.replace(prefix.as_str(), VIRTUAL_ROOT);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Apply the output cap: text longer than [`OUTPUT_CHAR_CAP`] characters is
/// cut at the cap and the truncation marker appended. This is a deliberate
/// lossy policy bounding response size; callers keep the untruncated text in
/// the report's `raw` field.
pub fn truncate(text: &str) -> String {
    if text.chars().count() <= OUTPUT_CHAR_CAP {
        return text.to_string();
    }
    let mut out: String = text.chars().take(OUTPUT_CHAR_CAP).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_redacts_workspace_prefix() {
        let root = PathBuf::from("/tmp/heron-check-abc123");
        let raw = "/tmp/heron-check-abc123/src/main.tsx(1,5): error TS2322: nope";
        let normalized = normalize(raw, &root);
        assert_eq!(normalized, "/app/src/main.tsx(1,5): error TS2322: nope");
        assert!(!normalized.contains("heron-check-abc123"));
    }

    #[test]
    fn test_redacts_every_occurrence() {
        let root = PathBuf::from("/tmp/ws");
        let raw = "/tmp/ws/a.ts: see /tmp/ws/b.ts";
        assert_eq!(normalize(raw, &root), "/app/a.ts: see /app/b.ts");
    }

    #[test]
    fn test_drops_blank_lines() {
        let root = PathBuf::from("/tmp/ws");
        let raw = "first\n\n   \nsecond\n";
        assert_eq!(normalize(raw, &root), "first\nsecond");
    }

    #[test]
    fn test_truncate_is_identity_under_cap() {
        let text = "short diagnostics";
        assert_eq!(truncate(text), text);
    }

    #[test]
    fn test_truncation_law() {
        let text = "x".repeat(OUTPUT_CHAR_CAP + 500);
        let truncated = truncate(&text);
        assert_eq!(
            truncated.chars().count(),
            OUTPUT_CHAR_CAP + TRUNCATION_MARKER.chars().count()
        );
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncate_exactly_at_cap_is_untouched() {
        let text = "y".repeat(OUTPUT_CHAR_CAP);
        assert_eq!(truncate(&text), text);
    }
}
