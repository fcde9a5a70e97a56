//! Source parsing for the bundler.
//!
//! Every loaded unit parses under one permissive syntax mode (TypeScript with
//! JSX enabled) regardless of its original extension; the resolver already
//! distinguishes files only by lookup probing.

use swc_common::{FileName, SourceMap, Spanned, sync::Lrc};
use swc_ecma_ast::{EsVersion, Module};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax, lexer::Lexer};

use crate::diagnostics::BundleDiagnostic;

/// Parse snapshot content as a TSX module.
///
/// # Errors
///
/// Returns positioned diagnostics for fatal and recovered parse errors.
pub fn parse_tsx(source: &str, path: &str) -> Result<(Lrc<SourceMap>, Module), Vec<BundleDiagnostic>> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        Lrc::new(FileName::Custom(path.to_string())),
        source.to_string(),
    );

    let syntax = Syntax::Typescript(TsSyntax {
        tsx: true,
        decorators: true,
        ..Default::default()
    });

    let lexer = Lexer::new(syntax, EsVersion::Es2022, StringInput::from(&*fm), None);
    let mut parser = Parser::new_from(lexer);

    let module = match parser.parse_module() {
        Ok(module) => module,
        Err(err) => return Err(vec![to_diagnostic(&err, &cm, path)]),
    };

    let recovered: Vec<BundleDiagnostic> = parser
        .take_errors()
        .iter()
        .map(|err| to_diagnostic(err, &cm, path))
        .collect();
    if !recovered.is_empty() {
        return Err(recovered);
    }

    Ok((cm, module))
}

fn to_diagnostic(
    err: &swc_ecma_parser::error::Error,
    cm: &Lrc<SourceMap>,
    path: &str,
) -> BundleDiagnostic {
    let loc = cm.lookup_char_pos(err.span().lo);
    BundleDiagnostic {
        file: path.to_string(),
        line: loc.line,
        column: loc.col_display + 1,
        message: err.kind().msg().to_string(),
    }
}
