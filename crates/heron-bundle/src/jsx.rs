//! JSX lowering.
//!
//! Rewrites JSX elements and fragments into `React.createElement` calls (the
//! classic runtime), so bundle output is plain executable JavaScript. Runs
//! after type stripping, which leaves JSX nodes in place.

use swc_common::DUMMY_SP;
use swc_ecma_ast::*;
use swc_ecma_visit::{VisitMut, VisitMutWith};

/// Visitor replacing every JSX expression with a `React.createElement` call.
pub struct JsxLowerer;

impl VisitMut for JsxLowerer {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        // Lower inner expressions first so nested JSX inside expression
        // containers is already plain when the outer element is rebuilt.
        expr.visit_mut_children_with(self);

        match expr {
            Expr::JSXElement(element) => {
                *expr = lower_element(element);
            }
            Expr::JSXFragment(fragment) => {
                *expr = lower_fragment(fragment);
            }
            _ => {}
        }
    }
}

fn lower_element(element: &JSXElement) -> Expr {
    let tag = tag_expr(&element.opening.name);
    let props = props_expr(&element.opening.attrs);
    let children = children_args(&element.children);
    create_element_call(tag, props, children)
}

fn lower_fragment(fragment: &JSXFragment) -> Expr {
    let tag = react_member("Fragment");
    let children = children_args(&fragment.children);
    create_element_call(tag, null_expr(), children)
}

/// Intrinsic elements (lowercase) become string literals; components stay
/// identifier or member references.
fn tag_expr(name: &JSXElementName) -> Expr {
    match name {
        JSXElementName::Ident(ident) => {
            let sym = ident.sym.as_str();
            if sym.starts_with(|c: char| c.is_ascii_lowercase()) {
                str_lit(sym)
            } else {
                Expr::Ident(ident.clone())
            }
        }
        JSXElementName::JSXMemberExpr(member) => jsx_member_to_expr(member),
        JSXElementName::JSXNamespacedName(ns) => {
            str_lit(&format!("{}:{}", ns.ns.sym, ns.name.sym))
        }
    }
}

fn jsx_member_to_expr(member: &JSXMemberExpr) -> Expr {
    let obj = match &member.obj {
        JSXObject::Ident(ident) => Expr::Ident(ident.clone()),
        JSXObject::JSXMemberExpr(inner) => jsx_member_to_expr(inner),
    };
    member_expr(obj, member.prop.sym.as_str())
}

fn props_expr(attrs: &[JSXAttrOrSpread]) -> Expr {
    if attrs.is_empty() {
        return null_expr();
    }

    let mut props: Vec<PropOrSpread> = Vec::with_capacity(attrs.len());
    for attr in attrs {
        match attr {
            JSXAttrOrSpread::JSXAttr(attr) => {
                let key = attr_key(&attr.name);
                let value = attr_value(attr.value.as_ref());
                props.push(PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
                    key,
                    value: Box::new(value),
                }))));
            }
            JSXAttrOrSpread::SpreadElement(spread) => {
                props.push(PropOrSpread::Spread(SpreadElement {
                    dot3_token: DUMMY_SP,
                    expr: spread.expr.clone(),
                }));
            }
        }
    }

    Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props,
    })
}

/// Attribute keys are emitted as string properties; that stays valid for
/// hyphenated names like `data-id` and `aria-label`.
fn attr_key(name: &JSXAttrName) -> PropName {
    let text = match name {
        JSXAttrName::Ident(ident) => ident.sym.to_string(),
        JSXAttrName::JSXNamespacedName(ns) => format!("{}:{}", ns.ns.sym, ns.name.sym),
    };
    PropName::Str(Str {
        span: DUMMY_SP,
        value: text.into(),
        raw: None,
    })
}

fn attr_value(value: Option<&JSXAttrValue>) -> Expr {
    match value {
        // Bare attribute: <input disabled />
        None => Expr::Lit(Lit::Bool(Bool {
            span: DUMMY_SP,
            value: true,
        })),
        Some(JSXAttrValue::Str(s)) => Expr::Lit(Lit::Str(s.clone())),
        Some(JSXAttrValue::JSXExprContainer(container)) => match &container.expr {
            JSXExpr::Expr(expr) => (**expr).clone(),
            JSXExpr::JSXEmptyExpr(_) => Expr::Lit(Lit::Bool(Bool {
                span: DUMMY_SP,
                value: true,
            })),
        },
        Some(JSXAttrValue::JSXElement(element)) => lower_element(element),
        Some(JSXAttrValue::JSXFragment(fragment)) => lower_fragment(fragment),
    }
}

fn children_args(children: &[JSXElementChild]) -> Vec<ExprOrSpread> {
    let mut args = Vec::new();
    for child in children {
        match child {
            JSXElementChild::JSXText(text) => {
                let raw = text.value.to_string();
                if let Some(value) = jsx_text_value(&raw) {
                    args.push(plain_arg(str_lit(&value)));
                }
            }
            JSXElementChild::JSXExprContainer(container) => {
                if let JSXExpr::Expr(expr) = &container.expr {
                    args.push(plain_arg((**expr).clone()));
                }
            }
            JSXElementChild::JSXElement(element) => {
                args.push(plain_arg(lower_element(element)));
            }
            JSXElementChild::JSXFragment(fragment) => {
                args.push(plain_arg(lower_fragment(fragment)));
            }
            JSXElementChild::JSXSpreadChild(spread) => {
                args.push(ExprOrSpread {
                    spread: Some(DUMMY_SP),
                    expr: spread.expr.clone(),
                });
            }
        }
    }
    args
}

/// JSX text semantics: tabs become spaces, whitespace touching a newline is
/// insignificant, and surviving lines join with single spaces. Whitespace
/// with no newline is significant, so the space in `<b>a</b> <i>b</i>` stays.
fn jsx_text_value(raw: &str) -> Option<String> {
    let lines: Vec<String> = raw.split('\n').map(|line| line.replace('\t', " ")).collect();
    let last_non_blank = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .unwrap_or(0);

    let mut out = String::new();
    for (index, line) in lines.iter().enumerate() {
        let mut piece = line.as_str();
        if index != 0 {
            piece = piece.trim_start();
        }
        if index != lines.len() - 1 {
            piece = piece.trim_end();
        }
        if piece.is_empty() {
            continue;
        }
        out.push_str(piece);
        if index != last_non_blank {
            out.push(' ');
        }
    }

    if out.is_empty() { None } else { Some(out) }
}

fn create_element_call(tag: Expr, props: Expr, children: Vec<ExprOrSpread>) -> Expr {
    let mut args = vec![plain_arg(tag), plain_arg(props)];
    args.extend(children);

    Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: Default::default(),
        callee: Callee::Expr(Box::new(react_member("createElement"))),
        args,
        type_args: None,
    })
}

fn plain_arg(expr: Expr) -> ExprOrSpread {
    ExprOrSpread {
        spread: None,
        expr: Box::new(expr),
    }
}

fn react_member(name: &str) -> Expr {
    member_expr(ident_expr("React"), name)
}

fn ident_expr(name: &str) -> Expr {
    Expr::Ident(Ident::new(name.into(), DUMMY_SP, Default::default()))
}

fn member_expr(obj: Expr, prop: &str) -> Expr {
    Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(obj),
        prop: MemberProp::Ident(IdentName {
            span: DUMMY_SP,
            sym: prop.into(),
        }),
    })
}

fn str_lit(text: &str) -> Expr {
    Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: text.into(),
        raw: None,
    }))
}

fn null_expr() -> Expr {
    Expr::Lit(Lit::Null(Null { span: DUMMY_SP }))
}
