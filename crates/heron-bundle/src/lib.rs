//! In-memory ESM bundler for snapshot web apps.
//!
//! Takes an immutable path→content snapshot, resolves the module graph from
//! the fixed entry point, strips types, lowers JSX, and emits one ESM
//! JavaScript artifact. Internal modules become factory registrations on a
//! module table; allowlisted external libraries stay as real top-level
//! imports for the deployed page's import map to satisfy. No snapshot file
//! ever touches the real filesystem.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use heron_core::{Snapshot, SnapshotError};

pub mod diagnostics;
pub mod externals;
pub mod graph;
pub mod init;
pub mod jsx;
pub mod parse;
pub mod resolver;
pub mod rewrite;
pub mod transform;

pub use diagnostics::BundleDiagnostic;
pub use graph::ENTRY_POINT;

use rewrite::{EXPORTS_OBJECT, EXTERNALS_TABLE, FACTORIES_TABLE, LOAD_FN, MODULES_TABLE};

#[derive(Error, Debug)]
pub enum BundleError {
    #[error(transparent)]
    Input(#[from] SnapshotError),

    /// Parse, resolution, or rewrite problems, collected across the graph.
    #[error("{}", diagnostics::render(.0))]
    Diagnostics(Vec<BundleDiagnostic>),

    #[error("bundling produced no output")]
    EmptyOutput,

    #[error("internal bundler error: {0}")]
    Internal(String),
}

/// Per-request bundling knobs.
#[derive(Debug, Clone, Default)]
pub struct BundleOptions {
    /// Values exposed to app code through `process.env`.
    pub env: BTreeMap<String, String>,
}

/// A finished bundle.
#[derive(Debug, Clone)]
pub struct BundleOutput {
    /// The single ESM artifact.
    pub code: String,
    /// External library names the artifact imports, in first encounter
    /// order. The deployed page must satisfy these via its import map.
    pub externals: Vec<String>,
}

/// Bundle a snapshot into one ESM module.
///
/// # Errors
///
/// Invalid snapshots, unparseable or unresolvable modules, and empty output
/// all fail the whole operation; there is no partial bundle.
pub fn bundle(snapshot: &Snapshot, options: &BundleOptions) -> Result<BundleOutput, BundleError> {
    snapshot.validate()?;

    let graph = graph::load(snapshot).map_err(BundleError::Diagnostics)?;
    debug!(
        modules = graph.modules.len(),
        externals = graph.externals.len(),
        "module graph loaded"
    );
    let externals_list = graph.externals.clone();

    let mut transformed = Vec::with_capacity(graph.modules.len());
    let mut problems = Vec::new();
    for module in graph.modules {
        match transform::transform(module) {
            Ok(out) => transformed.push(out),
            Err(errors) => problems.extend(errors),
        }
    }
    if !problems.is_empty() {
        return Err(BundleError::Diagnostics(problems));
    }

    let mut code = String::new();

    // Hoisted imports for externals. These are the only import statements in
    // the output.
    for (index, name) in externals_list.iter().enumerate() {
        code.push_str(&format!(
            "import * as {} from \"{name}\";\n",
            externals::binding_name(index)
        ));
    }

    code.push_str(&format!("const {EXTERNALS_TABLE} = {{\n"));
    for (index, name) in externals_list.iter().enumerate() {
        code.push_str(&format!(
            "  \"{name}\": {},\n",
            externals::binding_name(index)
        ));
    }
    code.push_str("};\n");

    // App code may read process.env; browsers have no process global.
    let env_json = serde_json::to_string(&options.env)
        .map_err(|err| BundleError::Internal(format!("env serialization failed: {err}")))?;
    code.push_str(&format!("const process = {{ env: {env_json} }};\n"));

    code.push_str(&format!("const {MODULES_TABLE} = {{}};\n"));
    code.push_str(&format!("const {FACTORIES_TABLE} = {{}};\n"));
    // Lazy loader. The exports object is cached before the factory body
    // runs, so a cyclic import observes the partially-populated exports of
    // the module that started the cycle instead of recursing forever.
    code.push_str(&format!(
        "function {LOAD_FN}(path) {{\n  \
           if (!(path in {MODULES_TABLE})) {{\n    \
             const exports = {{}};\n    \
             {MODULES_TABLE}[path] = exports;\n    \
             {FACTORIES_TABLE}[path](exports);\n  \
           }}\n  \
           return {MODULES_TABLE}[path];\n\
         }}\n"
    ));

    // Register factories in dependency order; nothing executes until the
    // entry load below.
    for module in &transformed {
        code.push_str(&format!(
            "\n{FACTORIES_TABLE}[\"{}\"] = function({EXPORTS_OBJECT}) {{\n{}}};\n",
            module.path, module.code
        ));
    }

    code.push_str(&format!("\n{LOAD_FN}(\"{}\");\n", graph::ENTRY_POINT));

    if code.trim().is_empty() {
        return Err(BundleError::EmptyOutput);
    }

    debug!(bytes = code.len(), "bundle emitted");
    Ok(BundleOutput {
        code,
        externals: externals_list,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_of(files: &[(&str, &str)]) -> Snapshot {
        Snapshot::from_files(
            files
                .iter()
                .map(|(p, s)| (p.to_string(), s.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_bundles_small_app() {
        let snapshot = snapshot_of(&[
            (
                "src/main.tsx",
                "import React from \"react\";\nimport { createRoot } from \"react-dom/client\";\nimport App from \"./App\";\ncreateRoot(document.getElementById(\"root\")!).render(<App />);\n",
            ),
            (
                "src/App.tsx",
                "import React from \"react\";\nexport default function App() {\n  return <h1>hello</h1>;\n}\n",
            ),
        ]);
        let out = bundle(&snapshot, &BundleOptions::default()).unwrap();

        assert_eq!(
            out.externals,
            vec!["react".to_string(), "react-dom/client".to_string()]
        );
        assert!(out.code.contains("import * as __heron_import_0 from \"react\";"));
        assert!(out.code.contains("__heron_factories[\"src/App.tsx\"]"));
        assert!(out.code.contains("React.createElement"));
        // Dependency factory registers before the entry's, and the entry is
        // loaded only after every registration.
        let app = out.code.find("__heron_factories[\"src/App.tsx\"]").unwrap();
        let main = out.code.find("__heron_factories[\"src/main.tsx\"]").unwrap();
        let entry_load = out.code.rfind("__heron_load(\"src/main.tsx\");").unwrap();
        assert!(app < main);
        assert!(main < entry_load);
    }

    #[test]
    fn test_cyclic_imports_do_not_execute_before_registration() {
        let snapshot = snapshot_of(&[
            (
                "src/main.tsx",
                "import { a } from \"./a\";\nexport const top = a;\n",
            ),
            (
                "src/a.ts",
                "import { b } from \"./b\";\nexport const a = () => b;\n",
            ),
            (
                "src/b.ts",
                "import { a } from \"./a\";\nexport const b = () => a;\n",
            ),
        ]);
        let out = bundle(&snapshot, &BundleOptions::default()).unwrap();

        // Module bodies run lazily: the cyclic reads go through the loader,
        // and the only top-level execution is the entry load after the last
        // factory registration.
        assert!(out.code.contains("__heron_load(\"src/b.ts\").b"));
        assert!(!out.code.contains("(function()"));
        let last_registration = out.code.rfind("__heron_factories[").unwrap();
        let entry_load = out.code.rfind("__heron_load(\"src/main.tsx\");").unwrap();
        assert!(last_registration < entry_load);
    }

    #[test]
    fn test_process_env_prelude_is_always_present() {
        let snapshot = snapshot_of(&[("src/main.tsx", "export {};\n")]);
        let out = bundle(&snapshot, &BundleOptions::default()).unwrap();
        assert!(out.code.contains("const process = { env: {} };"));
    }

    #[test]
    fn test_env_values_are_injected() {
        let snapshot = snapshot_of(&[(
            "src/main.tsx",
            "export const url = process.env.API_URL;\n",
        )]);
        let mut env = BTreeMap::new();
        env.insert("API_URL".to_string(), "https://api.example.test".to_string());
        let out = bundle(&snapshot, &BundleOptions { env }).unwrap();
        assert!(out.code.contains("\"API_URL\":\"https://api.example.test\""));
    }

    #[test]
    fn test_no_externals_without_library_imports() {
        let snapshot = snapshot_of(&[("src/main.tsx", "export const n = 1;\n")]);
        let out = bundle(&snapshot, &BundleOptions::default()).unwrap();
        assert!(out.externals.is_empty());
        assert!(!out.code.contains("import * as"));
    }

    #[test]
    fn test_missing_entry_is_a_diagnostic_error() {
        let snapshot = snapshot_of(&[("src/App.tsx", "export {};\n")]);
        let err = bundle(&snapshot, &BundleOptions::default()).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("src/main.tsx"));
        assert!(text.contains("entry point"));
    }

    #[test]
    fn test_parse_errors_are_rendered_with_positions() {
        let snapshot = snapshot_of(&[("src/main.tsx", "const = broken\n")]);
        let err = bundle(&snapshot, &BundleOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("src/main.tsx:1:"));
    }

    #[test]
    fn test_invalid_snapshot_is_rejected() {
        let snapshot = snapshot_of(&[]);
        assert!(matches!(
            bundle(&snapshot, &BundleOptions::default()),
            Err(BundleError::Input(_))
        ));
    }

    #[test]
    fn test_unresolved_import_fails_whole_bundle() {
        let snapshot = snapshot_of(&[(
            "src/main.tsx",
            "import App from \"./Gone\";\nexport default App;\n",
        )]);
        let err = bundle(&snapshot, &BundleOptions::default()).unwrap_err();
        assert!(err.to_string().contains("could not resolve \"./Gone\""));
    }
}
