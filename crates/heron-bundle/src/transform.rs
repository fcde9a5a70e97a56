//! Per-module transformation.
//!
//! Takes a parsed module and produces the JavaScript text of its factory
//! body: types stripped, JSX lowered, ESM syntax rewritten against the
//! registry tables, exports appended as assignments onto the factory's
//! exports object.

use swc_common::Mark;
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_codegen::{Config as CodegenConfig, Emitter, text_writer::JsWriter};
use swc_ecma_transforms_base::{fixer::fixer, resolver};
use swc_ecma_transforms_typescript::strip;
use swc_ecma_visit::VisitMutWith;

use crate::diagnostics::BundleDiagnostic;
use crate::graph::LoadedModule;
use crate::init::with_syntax_env;
use crate::jsx::JsxLowerer;
use crate::rewrite::{EXPORTS_OBJECT, EsmRewriter};

/// One module's emitted factory body.
#[derive(Debug)]
pub struct TransformedModule {
    pub path: String,
    pub code: String,
}

/// Run the full transform pipeline on a loaded module.
///
/// # Errors
///
/// Returns diagnostics for constructs the rewrite cannot express (e.g.
/// dynamic imports with computed specifiers) and for codegen failures.
pub fn transform(loaded: LoadedModule) -> Result<TransformedModule, Vec<BundleDiagnostic>> {
    let LoadedModule {
        path,
        source_map,
        module,
        deps,
    } = loaded;

    let mut program = Program::Module(module);
    let mut rewriter = EsmRewriter::new(&deps);

    with_syntax_env(|| {
        let unresolved_mark = Mark::new();
        let top_level_mark = Mark::new();

        program.visit_mut_with(&mut resolver(unresolved_mark, top_level_mark, true));
        program.mutate(&mut strip(unresolved_mark, top_level_mark));
        program.visit_mut_with(&mut JsxLowerer);
        program.visit_mut_with(&mut rewriter);
        program.visit_mut_with(&mut fixer(None));
    });

    if !rewriter.errors.is_empty() {
        return Err(rewriter
            .errors
            .iter()
            .map(|message| BundleDiagnostic::file_level(&path, message))
            .collect());
    }

    let module = match program {
        Program::Module(module) => module,
        Program::Script(_) => {
            return Err(vec![BundleDiagnostic::file_level(
                &path,
                "transform produced a script, expected a module",
            )]);
        }
    };

    let mut buf = vec![];
    {
        let writer = JsWriter::new(source_map.clone(), "\n", &mut buf, None);
        let codegen_config = CodegenConfig::default()
            .with_target(EsVersion::Es2022)
            .with_ascii_only(false)
            .with_minify(false)
            .with_omit_last_semi(false);
        let mut emitter = Emitter {
            cfg: codegen_config,
            cm: source_map,
            comments: None,
            wr: writer,
        };
        emitter.emit_module(&module).map_err(|err| {
            vec![BundleDiagnostic::file_level(
                &path,
                format!("code generation failed: {err}"),
            )]
        })?;
    }

    let mut code = String::from_utf8(buf).map_err(|err| {
        vec![BundleDiagnostic::file_level(
            &path,
            format!("code generation produced invalid UTF-8: {err}"),
        )]
    })?;

    if !code.ends_with('\n') {
        code.push('\n');
    }
    for (exported, local) in &rewriter.exports {
        code.push_str(&format!("{EXPORTS_OBJECT}.{exported} = {local};\n"));
    }

    Ok(TransformedModule { path, code })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph;
    use heron_core::Snapshot;
    use std::collections::BTreeMap;

    fn single(source: &str) -> TransformedModule {
        let snapshot = Snapshot::from_files(
            [("src/main.tsx".to_string(), source.to_string())]
                .into_iter()
                .collect::<BTreeMap<_, _>>(),
        );
        let graph = graph::load(&snapshot).unwrap();
        let loaded = graph.modules.into_iter().next().unwrap();
        transform(loaded).unwrap()
    }

    #[test]
    fn test_types_are_stripped() {
        let out = single("export const n: number = 1;\n");
        assert!(!out.code.contains(": number"));
        assert!(out.code.contains("const n = 1"));
    }

    #[test]
    fn test_jsx_is_lowered() {
        let out = single("export const el = <div className=\"a\">hi</div>;\n");
        assert!(out.code.contains("React.createElement"));
        assert!(!out.code.contains("<div"));
    }

    #[test]
    fn test_exports_are_appended() {
        let out = single("export const total = 3;\nexport default total;\n");
        assert!(out.code.contains("__heron_exports.total = total;"));
        assert!(out.code.contains("__heron_exports.default = __heron_default;"));
    }

    #[test]
    fn test_external_import_reads_table() {
        let out = single("import React from \"react\";\nexport default () => React;\n");
        assert!(out.code.contains("__heron_externals[\"react\"].default"));
    }

    #[test]
    fn test_internal_import_goes_through_loader() {
        let snapshot = Snapshot::from_files(
            [
                (
                    "src/main.tsx".to_string(),
                    "import { n } from \"./util\";\nexport default n;\n".to_string(),
                ),
                ("src/util.ts".to_string(), "export const n = 1;\n".to_string()),
            ]
            .into_iter()
            .collect::<BTreeMap<_, _>>(),
        );
        let graph = graph::load(&snapshot).unwrap();
        let entry = graph
            .modules
            .into_iter()
            .find(|m| m.path == "src/main.tsx")
            .unwrap();
        let out = transform(entry).unwrap();
        assert!(out.code.contains("__heron_load(\"src/util.ts\").n"));
    }

    #[test]
    fn test_non_literal_dynamic_import_is_rejected() {
        let snapshot = Snapshot::from_files(
            [(
                "src/main.tsx".to_string(),
                "const name = \"./x\";\nexport const p = import(name);\n".to_string(),
            )]
            .into_iter()
            .collect::<BTreeMap<_, _>>(),
        );
        let graph = graph::load(&snapshot).unwrap();
        let loaded = graph.modules.into_iter().next().unwrap();
        let errs = transform(loaded).unwrap_err();
        assert!(errs[0].message.contains("non-literal"));
    }
}
