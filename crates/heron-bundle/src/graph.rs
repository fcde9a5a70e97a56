//! Module graph construction.
//!
//! Starting from the fixed entry point, parses each reachable snapshot file,
//! resolves its import specifiers, and produces modules in dependency order
//! (dependencies before dependents, entry last). Cycles are tolerated: a
//! module already being visited is not re-entered, so a back-edge simply
//! keeps the current ordering.

use std::collections::{HashMap, HashSet};
use std::fmt;
use swc_common::{SourceMap, sync::Lrc};
use swc_ecma_ast::{Callee, Expr, Lit, Module, ModuleDecl, ModuleItem};
use swc_ecma_visit::{Visit, VisitWith};

use heron_core::Snapshot;

use crate::diagnostics::BundleDiagnostic;
use crate::parse;
use crate::resolver::{self, ModuleRef};

/// Fixed bundling entry point within every snapshot.
pub const ENTRY_POINT: &str = "src/main.tsx";

/// One parsed snapshot module with its resolved dependency map.
pub struct LoadedModule {
    /// Canonical snapshot path.
    pub path: String,
    pub source_map: Lrc<SourceMap>,
    pub module: Module,
    /// Specifier text as written, mapped to its resolution.
    pub deps: HashMap<String, ModuleRef>,
}

// SourceMap carries no Debug impl, so summarize.
impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("path", &self.path)
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

/// The reachable portion of a snapshot, ready for emission.
#[derive(Debug)]
pub struct ModuleGraph {
    /// Modules in dependency order; the entry point is last.
    pub modules: Vec<LoadedModule>,
    /// External library names referenced anywhere in the graph, in first
    /// encounter order.
    pub externals: Vec<String>,
}

/// Build the graph for a snapshot.
///
/// # Errors
///
/// Collects parse and resolution diagnostics across the whole reachable
/// graph rather than stopping at the first problem.
pub fn load(snapshot: &Snapshot) -> Result<ModuleGraph, Vec<BundleDiagnostic>> {
    if !snapshot.contains(ENTRY_POINT) {
        return Err(vec![BundleDiagnostic::file_level(
            ENTRY_POINT,
            format!("entry point \"{ENTRY_POINT}\" not found in snapshot"),
        )]);
    }

    let mut loader = Loader {
        snapshot,
        visiting: HashSet::new(),
        done: HashSet::new(),
        ordered: Vec::new(),
        externals: Vec::new(),
        diagnostics: Vec::new(),
    };
    loader.visit(ENTRY_POINT);

    if loader.diagnostics.is_empty() {
        Ok(ModuleGraph {
            modules: loader.ordered,
            externals: loader.externals,
        })
    } else {
        Err(loader.diagnostics)
    }
}

struct Loader<'a> {
    snapshot: &'a Snapshot,
    visiting: HashSet<String>,
    done: HashSet<String>,
    ordered: Vec<LoadedModule>,
    externals: Vec<String>,
    diagnostics: Vec<BundleDiagnostic>,
}

impl Loader<'_> {
    fn visit(&mut self, path: &str) {
        if self.done.contains(path) || self.visiting.contains(path) {
            return;
        }
        self.visiting.insert(path.to_string());

        let Some(source) = self.snapshot.get(path) else {
            // Unreachable through resolution, which only yields existing
            // paths, but the graph stays consistent if it happens.
            self.diagnostics.push(BundleDiagnostic::file_level(
                path,
                "module disappeared from snapshot",
            ));
            self.visiting.remove(path);
            return;
        };

        match parse::parse_tsx(source, path) {
            Ok((source_map, module)) => {
                let mut deps = HashMap::new();
                for specifier in collect_specifiers(&module) {
                    match resolver::resolve(self.snapshot, &specifier, Some(path)) {
                        Some(ModuleRef::Internal(target)) => {
                            self.visit(&target);
                            deps.insert(specifier, ModuleRef::Internal(target));
                        }
                        Some(ModuleRef::External(name)) => {
                            if !self.externals.contains(&name) {
                                self.externals.push(name.clone());
                            }
                            deps.insert(specifier, ModuleRef::External(name));
                        }
                        None => {
                            self.diagnostics.push(BundleDiagnostic::file_level(
                                path,
                                format!("could not resolve \"{specifier}\""),
                            ));
                        }
                    }
                }
                self.ordered.push(LoadedModule {
                    path: path.to_string(),
                    source_map,
                    module,
                    deps,
                });
            }
            Err(errors) => self.diagnostics.extend(errors),
        }

        self.visiting.remove(path);
        self.done.insert(path.to_string());
    }
}

/// Every specifier a module depends on: static imports, re-exports, and
/// string-literal dynamic imports. Duplicates are removed, order preserved.
fn collect_specifiers(module: &Module) -> Vec<String> {
    let mut specifiers = Vec::new();

    for item in &module.body {
        if let ModuleItem::ModuleDecl(decl) = item {
            let src = match decl {
                ModuleDecl::Import(import) => Some(&import.src),
                ModuleDecl::ExportNamed(export) => export.src.as_ref(),
                ModuleDecl::ExportAll(export) => Some(&export.src),
                _ => None,
            };
            if let Some(src) = src
                && let Some(text) = src.value.as_str()
            {
                specifiers.push(text.to_string());
            }
        }
    }

    let mut collector = DynamicImportCollector {
        specifiers: &mut specifiers,
    };
    module.visit_with(&mut collector);

    let mut seen = HashSet::new();
    specifiers.retain(|s| seen.insert(s.clone()));
    specifiers
}

struct DynamicImportCollector<'a> {
    specifiers: &'a mut Vec<String>,
}

impl Visit for DynamicImportCollector<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        expr.visit_children_with(self);

        if let Expr::Call(call) = expr
            && matches!(call.callee, Callee::Import(_))
            && let Some(arg) = call.args.first()
            && let Expr::Lit(Lit::Str(s)) = &*arg.expr
            && let Some(text) = s.value.as_str()
        {
            self.specifiers.push(text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot_of(files: &[(&str, &str)]) -> Snapshot {
        Snapshot::from_files(
            files
                .iter()
                .map(|(p, s)| (p.to_string(), s.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_dependencies_come_before_dependents() {
        let snapshot = snapshot_of(&[
            ("src/main.tsx", "import App from \"./App\";\nApp();\n"),
            ("src/App.tsx", "import { n } from \"./util\";\nexport default () => n;\n"),
            ("src/util.ts", "export const n = 1;\n"),
        ]);
        let graph = load(&snapshot).unwrap();
        let order: Vec<&str> = graph.modules.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(order, vec!["src/util.ts", "src/App.tsx", "src/main.tsx"]);
    }

    #[test]
    fn test_entry_is_always_last() {
        let snapshot = snapshot_of(&[("src/main.tsx", "export {};\n")]);
        let graph = load(&snapshot).unwrap();
        assert_eq!(graph.modules.last().unwrap().path, ENTRY_POINT);
    }

    #[test]
    fn test_missing_entry_point() {
        let snapshot = snapshot_of(&[("src/App.tsx", "export {};\n")]);
        let errs = load(&snapshot).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].file, ENTRY_POINT);
        assert!(errs[0].message.contains("entry point"));
    }

    #[test]
    fn test_unreachable_files_are_ignored() {
        let snapshot = snapshot_of(&[
            ("src/main.tsx", "export {};\n"),
            ("src/orphan.ts", "this is not valid syntax ][\n"),
        ]);
        // Parse problems in unreachable files never surface.
        let graph = load(&snapshot).unwrap();
        assert_eq!(graph.modules.len(), 1);
    }

    #[test]
    fn test_cycle_is_tolerated() {
        let snapshot = snapshot_of(&[
            ("src/main.tsx", "import { a } from \"./a\";\nexport const top = a;\n"),
            ("src/a.ts", "import { b } from \"./b\";\nexport const a = () => b;\n"),
            ("src/b.ts", "import { a } from \"./a\";\nexport const b = () => a;\n"),
        ]);
        let graph = load(&snapshot).unwrap();
        assert_eq!(graph.modules.len(), 3);
        assert_eq!(graph.modules.last().unwrap().path, ENTRY_POINT);
    }

    #[test]
    fn test_externals_collected_once() {
        let snapshot = snapshot_of(&[
            (
                "src/main.tsx",
                "import React from \"react\";\nimport App from \"./App\";\nexport const x = [React, App];\n",
            ),
            (
                "src/App.tsx",
                "import React from \"react\";\nimport { clsx } from \"clsx\";\nexport default () => clsx(\"a\");\n",
            ),
        ]);
        let graph = load(&snapshot).unwrap();
        assert_eq!(graph.externals, vec!["react".to_string(), "clsx".to_string()]);
    }

    #[test]
    fn test_resolution_miss_names_specifier_and_importer() {
        let snapshot = snapshot_of(&[("src/main.tsx", "import App from \"./Gone\";\nApp();\n")]);
        let errs = load(&snapshot).unwrap_err();
        assert_eq!(errs[0].file, "src/main.tsx");
        assert!(errs[0].message.contains("./Gone"));
    }

    #[test]
    fn test_dynamic_import_literal_is_a_dependency() {
        let snapshot = snapshot_of(&[
            ("src/main.tsx", "const p = import(\"./lazy\");\nexport default p;\n"),
            ("src/lazy.ts", "export const lazy = true;\n"),
        ]);
        let graph = load(&snapshot).unwrap();
        let order: Vec<&str> = graph.modules.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(order, vec!["src/lazy.ts", "src/main.tsx"]);
    }

    #[test]
    fn test_reexport_sources_are_dependencies() {
        let snapshot = snapshot_of(&[
            ("src/main.tsx", "export { helper } from \"./util\";\n"),
            ("src/util.ts", "export const helper = 1;\n"),
        ]);
        let graph = load(&snapshot).unwrap();
        assert_eq!(graph.modules.len(), 2);
        assert_eq!(graph.modules[0].path, "src/util.ts");
    }
}
