//! ESM-to-registry rewriting.
//!
//! Each module's import and export statements are rewritten so the module
//! body can run inside a factory function:
//!
//! ```javascript
//! // import { useState } from "react";
//! const useState = __heron_externals["react"].useState;
//!
//! // import App from "./App";
//! const App = __heron_load("src/App.tsx").default;
//!
//! // export const total = 3;
//! const total = 3;
//! // ...appended after the body:
//! __heron_exports.total = total;
//! ```
//!
//! Internal modules load lazily through `__heron_load`, which runs the
//! module's factory on first read and memoizes into the `__heron_modules`
//! registry; allowlisted externals read from the `__heron_externals` table
//! populated by hoisted top-level imports.

use std::collections::HashMap;
use swc_common::{DUMMY_SP, FileName, SourceMap, sync::Lrc};
use swc_ecma_ast::*;
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, lexer::Lexer};
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::resolver::ModuleRef;

/// Name of the module registry (loaded-exports cache) in bundle output.
pub const MODULES_TABLE: &str = "__heron_modules";
/// Name of the factory table in bundle output.
pub const FACTORIES_TABLE: &str = "__heron_factories";
/// Name of the lazy loader function in bundle output.
pub const LOAD_FN: &str = "__heron_load";
/// Name of the external namespace table in bundle output.
pub const EXTERNALS_TABLE: &str = "__heron_externals";
/// Name of the per-factory exports object.
pub const EXPORTS_OBJECT: &str = "__heron_exports";

/// Rewrites one module's ESM syntax against its resolved dependency map.
pub struct EsmRewriter<'a> {
    deps: &'a HashMap<String, ModuleRef>,
    /// Collected `(exported_name, local_name)` pairs, appended by the caller
    /// after the module body.
    pub exports: Vec<(String, String)>,
    /// Rewrite problems (unresolvable dynamic imports).
    pub errors: Vec<String>,
}

impl<'a> EsmRewriter<'a> {
    pub fn new(deps: &'a HashMap<String, ModuleRef>) -> Self {
        Self {
            deps,
            exports: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Access expression for a resolved specifier. Internal modules go
    /// through the lazy loader so no factory executes before every factory
    /// is registered; cyclic imports then observe partially-populated
    /// exports instead of failing at load time.
    fn module_access(&mut self, specifier: &str) -> Option<String> {
        match self.deps.get(specifier) {
            Some(ModuleRef::Internal(path)) => Some(format!("{LOAD_FN}(\"{path}\")")),
            Some(ModuleRef::External(name)) => Some(format!("{EXTERNALS_TABLE}[\"{name}\"]")),
            None => {
                self.errors
                    .push(format!("unresolved specifier \"{specifier}\""));
                None
            }
        }
    }

    fn is_external(&self, specifier: &str) -> bool {
        matches!(self.deps.get(specifier), Some(ModuleRef::External(_)))
    }

    fn export_name(name: &ModuleExportName) -> String {
        match name {
            ModuleExportName::Ident(ident) => ident.sym.to_string(),
            ModuleExportName::Str(s) => s.value.as_str().unwrap_or_default().to_string(),
        }
    }

    /// Collect every bound name from a binding pattern (destructuring
    /// exports bind several names at once).
    fn collect_pattern_names(pat: &Pat, exports: &mut Vec<(String, String)>) {
        match pat {
            Pat::Ident(ident) => {
                let name = ident.sym.to_string();
                exports.push((name.clone(), name));
            }
            Pat::Object(obj) => {
                for prop in &obj.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            Self::collect_pattern_names(&kv.value, exports);
                        }
                        ObjectPatProp::Assign(assign) => {
                            let name = assign.key.sym.to_string();
                            exports.push((name.clone(), name));
                        }
                        ObjectPatProp::Rest(rest) => {
                            Self::collect_pattern_names(&rest.arg, exports);
                        }
                    }
                }
            }
            Pat::Array(arr) => {
                for elem in arr.elems.iter().flatten() {
                    Self::collect_pattern_names(elem, exports);
                }
            }
            Pat::Rest(rest) => {
                Self::collect_pattern_names(&rest.arg, exports);
            }
            Pat::Assign(assign) => {
                Self::collect_pattern_names(&assign.left, exports);
            }
            _ => {}
        }
    }

    fn rewrite_import(&mut self, import: &ImportDecl, out: &mut Vec<ModuleItem>) {
        let specifier = import.src.value.as_str().unwrap_or_default().to_string();
        let Some(access) = self.module_access(&specifier) else {
            return;
        };

        for item in &import.specifiers {
            match item {
                // import App from "./App"
                ImportSpecifier::Default(default) => {
                    out.push(ModuleItem::Stmt(const_stmt(
                        default.local.sym.as_str(),
                        &format!("{access}.default"),
                    )));
                }
                // import { a, b as c } from "./mod"
                ImportSpecifier::Named(named) => {
                    let imported = named
                        .imported
                        .as_ref()
                        .map(Self::export_name)
                        .unwrap_or_else(|| named.local.sym.to_string());
                    out.push(ModuleItem::Stmt(const_stmt(
                        named.local.sym.as_str(),
                        &format!("{access}.{imported}"),
                    )));
                }
                // import * as ns from "./mod"
                ImportSpecifier::Namespace(ns) => {
                    out.push(ModuleItem::Stmt(const_stmt(ns.local.sym.as_str(), &access)));
                }
            }
        }

        // Side-effect import. Externals already ran via their hoisted
        // top-level import; for internal modules the bare load call runs the
        // factory if it has not run yet.
        if import.specifiers.is_empty() && !self.is_external(&specifier) {
            out.push(ModuleItem::Stmt(expr_stmt(&format!("{access};"))));
        }
    }
}

impl VisitMut for EsmRewriter<'_> {
    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        let mut new_items = Vec::with_capacity(items.len());

        for item in items.drain(..) {
            match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                    self.rewrite_import(&import, &mut new_items);
                }

                // export const/function/class declarations keep their body
                // and register the bound names.
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                    match &export.decl {
                        Decl::Var(var_decl) => {
                            for decl in &var_decl.decls {
                                Self::collect_pattern_names(&decl.name, &mut self.exports);
                            }
                        }
                        Decl::Fn(fn_decl) => {
                            let name = fn_decl.ident.sym.to_string();
                            self.exports.push((name.clone(), name));
                        }
                        Decl::Class(class_decl) => {
                            let name = class_decl.ident.sym.to_string();
                            self.exports.push((name.clone(), name));
                        }
                        _ => {}
                    }
                    new_items.push(ModuleItem::Stmt(Stmt::Decl(export.decl.clone())));
                }

                // export default <expr>
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                    self.exports
                        .push(("default".to_string(), "__heron_default".to_string()));
                    new_items.push(ModuleItem::Stmt(Stmt::Decl(Decl::Var(Box::new(VarDecl {
                        span: DUMMY_SP,
                        ctxt: Default::default(),
                        kind: VarDeclKind::Const,
                        declare: false,
                        decls: vec![VarDeclarator {
                            span: DUMMY_SP,
                            name: Pat::Ident(BindingIdent {
                                id: Ident::new("__heron_default".into(), DUMMY_SP, Default::default()),
                                type_ann: None,
                            }),
                            init: Some(export.expr.clone()),
                            definite: false,
                        }],
                    })))));
                }

                // export default function/class
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match &export.decl
                {
                    DefaultDecl::Fn(fn_expr) => {
                        let name = fn_expr
                            .ident
                            .as_ref()
                            .map(|i| i.sym.to_string())
                            .unwrap_or_else(|| "__heron_default".to_string());
                        self.exports.push(("default".to_string(), name.clone()));
                        new_items.push(ModuleItem::Stmt(Stmt::Decl(Decl::Fn(FnDecl {
                            ident: Ident::new(name.into(), DUMMY_SP, Default::default()),
                            declare: false,
                            function: fn_expr.function.clone(),
                        }))));
                    }
                    DefaultDecl::Class(class_expr) => {
                        let name = class_expr
                            .ident
                            .as_ref()
                            .map(|i| i.sym.to_string())
                            .unwrap_or_else(|| "__heron_default".to_string());
                        self.exports.push(("default".to_string(), name.clone()));
                        new_items.push(ModuleItem::Stmt(Stmt::Decl(Decl::Class(ClassDecl {
                            ident: Ident::new(name.into(), DUMMY_SP, Default::default()),
                            declare: false,
                            class: class_expr.class.clone(),
                        }))));
                    }
                    DefaultDecl::TsInterfaceDecl(_) => {}
                },

                // export { a, b as c } [from "./mod"]
                ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(export)) => {
                    if let Some(src) = &export.src {
                        let specifier = src.value.as_str().unwrap_or_default().to_string();
                        let Some(access) = self.module_access(&specifier) else {
                            continue;
                        };
                        for item in &export.specifiers {
                            match item {
                                ExportSpecifier::Named(named) => {
                                    let orig = Self::export_name(&named.orig);
                                    let exported = named
                                        .exported
                                        .as_ref()
                                        .map(Self::export_name)
                                        .unwrap_or_else(|| orig.clone());
                                    new_items.push(ModuleItem::Stmt(expr_stmt(&format!(
                                        "{EXPORTS_OBJECT}.{exported} = {access}.{orig};"
                                    ))));
                                }
                                ExportSpecifier::Namespace(ns) => {
                                    let name = Self::export_name(&ns.name);
                                    new_items.push(ModuleItem::Stmt(expr_stmt(&format!(
                                        "{EXPORTS_OBJECT}.{name} = {access};"
                                    ))));
                                }
                                ExportSpecifier::Default(_) => {
                                    new_items.push(ModuleItem::Stmt(expr_stmt(&format!(
                                        "{EXPORTS_OBJECT}.default = {access}.default;"
                                    ))));
                                }
                            }
                        }
                    } else {
                        for item in &export.specifiers {
                            if let ExportSpecifier::Named(named) = item {
                                let orig = Self::export_name(&named.orig);
                                let exported = named
                                    .exported
                                    .as_ref()
                                    .map(Self::export_name)
                                    .unwrap_or_else(|| orig.clone());
                                self.exports.push((exported, orig));
                            }
                        }
                    }
                }

                // export * from "./mod"
                ModuleItem::ModuleDecl(ModuleDecl::ExportAll(export)) => {
                    let specifier = export.src.value.as_str().unwrap_or_default().to_string();
                    if let Some(access) = self.module_access(&specifier) {
                        new_items.push(ModuleItem::Stmt(expr_stmt(&format!(
                            "Object.assign({EXPORTS_OBJECT}, {access});"
                        ))));
                    }
                }

                other => new_items.push(other),
            }
        }

        *items = new_items;

        for item in items.iter_mut() {
            item.visit_mut_children_with(self);
        }
    }

    /// Dynamic imports: literal specifiers resolve at bundle time, anything
    /// else cannot be satisfied from an immutable snapshot.
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        let Expr::Call(call) = expr else { return };
        let Callee::Import(_) = &call.callee else {
            return;
        };
        let Some(arg) = call.args.first() else { return };

        if let Expr::Lit(Lit::Str(s)) = &*arg.expr {
            let specifier = s.value.as_str().unwrap_or_default().to_string();
            if let Some(access) = self.module_access(&specifier)
                && let Some(replacement) = parse_expr(&format!("Promise.resolve({access})"))
            {
                *expr = replacement;
            }
        } else {
            self.errors
                .push("dynamic import with a non-literal specifier is not supported".to_string());
        }
    }
}

/// `const <name> = <value>;` built by parsing the value expression.
fn const_stmt(name: &str, value: &str) -> Stmt {
    let init = parse_expr(value).map(Box::new);
    Stmt::Decl(Decl::Var(Box::new(VarDecl {
        span: DUMMY_SP,
        ctxt: Default::default(),
        kind: VarDeclKind::Const,
        declare: false,
        decls: vec![VarDeclarator {
            span: DUMMY_SP,
            name: Pat::Ident(BindingIdent {
                id: Ident::new(name.into(), DUMMY_SP, Default::default()),
                type_ann: None,
            }),
            init,
            definite: false,
        }],
    })))
}

fn expr_stmt(code: &str) -> Stmt {
    match parse_expr(code) {
        Some(expr) => Stmt::Expr(ExprStmt {
            span: DUMMY_SP,
            expr: Box::new(expr),
        }),
        None => Stmt::Empty(EmptyStmt { span: DUMMY_SP }),
    }
}

fn parse_expr(code: &str) -> Option<Expr> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(Lrc::new(FileName::Anon), code.to_string());
    let lexer = Lexer::new(
        Syntax::Es(EsSyntax::default()),
        EsVersion::Es2022,
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);
    parser.parse_expr().ok().map(|expr| *expr)
}
