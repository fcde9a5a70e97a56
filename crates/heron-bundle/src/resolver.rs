//! Virtual module resolution over an immutable snapshot.
//!
//! Resolution is a pure function of the path→content map plus the ordered
//! extension-probe list; there is no global resolver state, so any number of
//! bundling operations can resolve concurrently.

use heron_core::Snapshot;

use crate::externals;

/// Extension suffixes probed, in order, when an exact lookup misses.
/// Component variants first, then plain-script variants.
pub const EXTENSION_PROBES: [&str; 4] = [".tsx", ".ts", ".jsx", ".js"];

/// A resolved module request, tagged by namespace.
///
/// `Internal` paths are loaded from the in-memory snapshot and never from the
/// real filesystem. `External` names bypass the snapshot entirely and remain
/// unresolved imports in the bundle output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleRef {
    Internal(String),
    External(String),
}

/// Resolve a specifier against the snapshot.
///
/// Order: allowlisted externals short-circuit; then the specifier with a
/// single leading `./` or `/` stripped is looked up exactly and via extension
/// probes; then the specifier joined to the importer's directory likewise.
/// `None` means the module cannot be found, reported against the original
/// (non-normalized) specifier by the caller.
pub fn resolve(snapshot: &Snapshot, specifier: &str, importer: Option<&str>) -> Option<ModuleRef> {
    if externals::is_external(specifier) {
        return Some(ModuleRef::External(specifier.to_string()));
    }

    let stripped = specifier
        .strip_prefix("./")
        .or_else(|| specifier.strip_prefix('/'))
        .unwrap_or(specifier);

    if let Some(path) = lookup(snapshot, &normalize_segments(stripped)) {
        return Some(ModuleRef::Internal(path));
    }

    if let Some(importer) = importer {
        let base = match importer.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => "",
        };
        let joined = if base.is_empty() {
            normalize_segments(stripped)
        } else {
            normalize_segments(&format!("{base}/{stripped}"))
        };
        if let Some(path) = lookup(snapshot, &joined) {
            return Some(ModuleRef::Internal(path));
        }
    }

    None
}

/// Exact lookup, then the probe list in order.
fn lookup(snapshot: &Snapshot, path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    if snapshot.contains(path) {
        return Some(path.to_string());
    }
    for ext in EXTENSION_PROBES {
        let candidate = format!("{path}{ext}");
        if snapshot.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Collapse `.` and `..` segments. `..` beyond the root is dropped.
fn normalize_segments(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot_of(paths: &[&str]) -> Snapshot {
        Snapshot::from_files(
            paths
                .iter()
                .map(|p| (p.to_string(), String::from("export {};")))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_exact_lookup() {
        let snapshot = snapshot_of(&["src/main.tsx"]);
        assert_eq!(
            resolve(&snapshot, "./src/main.tsx", None),
            Some(ModuleRef::Internal("src/main.tsx".to_string()))
        );
    }

    #[test]
    fn test_extension_probing_relative_to_importer() {
        let snapshot = snapshot_of(&["src/App.tsx", "src/main.tsx"]);
        assert_eq!(
            resolve(&snapshot, "./App", Some("src/main.tsx")),
            Some(ModuleRef::Internal("src/App.tsx".to_string()))
        );
    }

    #[test]
    fn test_probe_order_prefers_component_variant() {
        let snapshot = snapshot_of(&["src/App.tsx", "src/App.js", "src/main.tsx"]);
        assert_eq!(
            resolve(&snapshot, "./App", Some("src/main.tsx")),
            Some(ModuleRef::Internal("src/App.tsx".to_string()))
        );
    }

    #[test]
    fn test_parent_directory_traversal() {
        let snapshot = snapshot_of(&["src/shared/format.ts", "src/components/Card.tsx"]);
        assert_eq!(
            resolve(&snapshot, "../shared/format", Some("src/components/Card.tsx")),
            Some(ModuleRef::Internal("src/shared/format.ts".to_string()))
        );
    }

    #[test]
    fn test_leading_slash_is_root_relative() {
        let snapshot = snapshot_of(&["src/lib/store.ts"]);
        assert_eq!(
            resolve(&snapshot, "/src/lib/store", Some("src/main.tsx")),
            Some(ModuleRef::Internal("src/lib/store.ts".to_string()))
        );
    }

    #[test]
    fn test_external_bypasses_snapshot() {
        // A snapshot file named like the library must not shadow it.
        let snapshot = snapshot_of(&["react.ts"]);
        assert_eq!(
            resolve(&snapshot, "react", Some("src/main.tsx")),
            Some(ModuleRef::External("react".to_string()))
        );
    }

    #[test]
    fn test_total_miss_is_none() {
        let snapshot = snapshot_of(&["src/main.tsx"]);
        assert_eq!(resolve(&snapshot, "./Missing", Some("src/main.tsx")), None);
    }

    #[test]
    fn test_non_allowlisted_bare_specifier_misses() {
        let snapshot = snapshot_of(&["src/main.tsx"]);
        assert_eq!(resolve(&snapshot, "left-pad", Some("src/main.tsx")), None);
    }
}
