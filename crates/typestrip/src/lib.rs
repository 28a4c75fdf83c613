#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::match_same_arms)]

//! typestrip: position-preserving type annotation stripping.
//!
//! Turns TypeScript-flavoured JavaScript into plain JavaScript by deleting
//! type syntax and nothing else. Every retained token keeps its line number,
//! so stack traces and breakpoints line up with the original file without a
//! source map.
//!
//! # Design Principles
//!
//! 1. **No AST**
//!    - A flat walk over a token stream decides where type syntax starts
//!    - Balanced-delimiter matching decides where it ends
//!    - Type contents are opaque and never interpreted
//!
//! 2. **Whole-file failure**
//!    - Anything that would need code generation (enums, namespaces,
//!      parameter properties) is an error, not a guess
//!    - A failed file produces a diagnostic and no code
//!
//! 3. **Lines are sacred**
//!    - Elided spans are replaced by the line terminators they contained
//!
//! # Example
//!
//! ```
//! use typestrip::{strip, StripOptions};
//!
//! let output = strip("const a: number = 4", &StripOptions::default());
//! assert!(output.is_ok());
//! assert_eq!(output.code, "const a = 4");
//! ```

mod bracket;
mod classify;
mod grouper;
mod lexer;
mod token;

pub mod batch;
pub mod diagnostic;
pub mod elision;
pub mod emit;
pub mod error;
pub mod imports;
pub mod options;
pub mod span;

pub use batch::{strip_file, strip_files, BatchOptions, FileOutcome, FileResult};
pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSeverity};
pub use elision::{ElidedSpan, SpanContext};
pub use emit::emit;
pub use error::{Error, StripError};
pub use lexer::Lexer;
pub use options::{ModifierSyntax, NonNullSyntax, StripOptions, CONFIG_FILE_NAME};
pub use span::{LineIndex, Span};
pub use token::{Token, TokenKind};

use serde::Serialize;

/// Result of stripping one source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StripOutput {
    /// Stripped JavaScript. Empty, and not to be used, when any diagnostic is
    /// an error.
    pub code: String,
    /// Removed ranges of the original text, sorted by offset.
    pub elided_spans: Vec<ElidedSpan>,
    pub diagnostics: Vec<Diagnostic>,
}

impl StripOutput {
    /// Whether `code` is usable.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    fn failed(source: &str, err: &StripError) -> Self {
        let index = LineIndex::new(source);
        Self {
            code: String::new(),
            elided_spans: Vec::new(),
            diagnostics: vec![Diagnostic::from_strip_error(err, &index)],
        }
    }
}

/// Strip type syntax from `source`.
///
/// Never fails outright: a fatal error is reported as an error diagnostic on
/// the returned output.
#[must_use]
pub fn strip(source: &str, options: &StripOptions) -> StripOutput {
    match elided_spans(source, options) {
        Ok(spans) => StripOutput {
            code: emit(source, &spans),
            elided_spans: spans,
            diagnostics: Vec::new(),
        },
        Err(err) => StripOutput::failed(source, &err),
    }
}

/// Classify `source` and return the spans [`strip`] would remove.
pub fn elided_spans(source: &str, options: &StripOptions) -> Result<Vec<ElidedSpan>, StripError> {
    if u32::try_from(source.len()).is_err() {
        return Err(StripError::InvalidToken {
            offset: 0,
            message: "source exceeds 4 GiB".to_string(),
        });
    }
    let tokens = Lexer::tokenize(source)?;
    classify::classify(source, &tokens, *options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_default(source: &str) -> String {
        let output = strip(source, &StripOptions::default());
        assert!(output.is_ok(), "unexpected diagnostics: {:?}", output.diagnostics);
        output.code
    }

    fn strip_all(source: &str) -> String {
        let options = StripOptions::default()
            .with_modifiers(ModifierSyntax::BareKeywordV1)
            .with_non_null(NonNullSyntax::PostfixBangV1);
        let output = strip(source, &options);
        assert!(output.is_ok(), "unexpected diagnostics: {:?}", output.diagnostics);
        output.code
    }

    fn first_error(source: &str) -> Diagnostic {
        let output = strip(source, &StripOptions::default());
        assert!(!output.is_ok());
        assert!(output.code.is_empty());
        output.diagnostics[0].clone()
    }

    #[test]
    fn test_function_annotations() {
        assert_eq!(
            strip_default("function foo(a: number, b: string): void {}"),
            "function foo(a, b) {}"
        );
    }

    #[test]
    fn test_variable_annotation() {
        assert_eq!(strip_default("const a: number = 4"), "const a = 4");
    }

    #[test]
    fn test_mixed_import() {
        assert_eq!(
            strip_default("import {someFunction, type someType} from 'm'"),
            "import {someFunction} from 'm'"
        );
    }

    #[test]
    fn test_overload_keeps_line_count() {
        assert_eq!(
            strip_default("function foo(x: number): number\nfunction foo(x: string): string {return x}"),
            "\nfunction foo(x) {return x}"
        );
    }

    #[test]
    fn test_class_fields_and_methods() {
        assert_eq!(
            strip_default("class Point { x: number; move(dx: number, dy: number): void {this.x += dx} }"),
            "class Point { x; move(dx, dy) {this.x += dx} }"
        );
    }

    #[test]
    fn test_mismatched_bracket_points_at_open() {
        let diagnostic = first_error("function foo(a: (Foo<T) {}");
        assert_eq!(diagnostic.kind, DiagnosticKind::MismatchedBracketKind);
        assert_eq!(diagnostic.severity, DiagnosticSeverity::Error);
        assert_eq!((diagnostic.line, diagnostic.column), (1, 21));
    }

    #[test]
    fn test_error_location_on_later_line() {
        let diagnostic = first_error("let ok = 1\nenum Color { Red }");
        assert_eq!(diagnostic.kind, DiagnosticKind::UnexpectedTypeSyntax);
        assert_eq!((diagnostic.line, diagnostic.column), (2, 1));
    }

    #[test]
    fn test_whole_statements_leave_blank_lines() {
        let source = "interface A {\n  x: number\n}\ntype B = A\nexport const c = 1";
        assert_eq!(strip_default(source), "\n\n\n\nexport const c = 1");
    }

    #[test]
    fn test_generics_and_assertions() {
        assert_eq!(
            strip_default("const m = new Map<string, number>()\nconst v = f<T>(x) as Foo"),
            "const m = new Map()\nconst v = f(x)"
        );
        assert_eq!(strip_default("if (a < b && c > d) {}"), "if (a < b && c > d) {}");
    }

    #[test]
    fn test_arrow_return_type() {
        assert_eq!(
            strip_default("const f = (a: number): string => `${a}`"),
            "const f = (a) => `${a}`"
        );
        assert_eq!(strip_default("const g = a ? (b) : c"), "const g = a ? (b) : c");
    }

    #[test]
    fn test_optional_features() {
        assert_eq!(
            strip_all("class A {\n  private readonly x!: number\n  m() { return this.x! }\n}"),
            "class A {\n    x\n  m() { return this.x }\n}"
        );
    }

    #[test]
    fn test_plain_javascript_is_unchanged() {
        let source = "const re = /a<b>/g;\nlet x = y / 2 > 1 ? `t${z}` : 'q';\nlabel: for (const k of o) break label;\nlet s = a >> 2 >= b >>> 1, t = c >>= 1;\n";
        assert_eq!(strip_default(source), source);
    }

    #[test]
    fn test_regex_after_statement_header() {
        let source = "if (x) /a/.test(y)\nwhile (i--) /b+/g.exec(s)\nfor (;;) /c/\nlet q = (a) / 2 / (b)\n";
        assert_eq!(strip_default(source), source);
    }

    const SCENARIOS: &[&str] = &[
        "function foo(a: number, b: string): void {}",
        "const a: number = 4",
        "import {someFunction, type someType} from 'm'",
        "function foo(x: number): number\nfunction foo(x: string): string {return x}",
        "class Point { x: number; move(dx: number, dy: number): void {this.x += dx} }",
        "interface A {\n  x: number\n}\ntype B = A\nexport const c = 1",
        "const m = new Map<string, number>()\nconst v = f<T>(x) as Foo",
        "const f = (a: number): string => `${a}`",
        "let a = b as unknown as C",
        "let a = b satisfies C as D",
        "const m = new Map<string, number>;",
        "class A { declare readonly x: number; y = 1 }",
        "class A {\n  private readonly x!: number\n  m() { return this.x! }\n}",
        "import { type T, v } from 'm'\nexport function f<A>(a: A, b?: T): A {\n  return g<A>(a) satisfies A\n}\n",
    ];

    #[test]
    fn test_idempotent() {
        for source in SCENARIOS {
            let once = strip_all(source);
            assert_eq!(strip_all(&once), once, "not idempotent for {source:?}");
        }
    }

    #[test]
    fn test_lines_preserved_for_retained_tokens() {
        let source = "type X = {\n  a: 1\n}\nfunction f(\n  a: number,\n  b: string\n): void {\n  return\n}\n";
        let output = strip(source, &StripOptions::default());
        assert!(output.is_ok());
        assert_eq!(source.lines().count(), output.code.lines().count());
        let original = LineIndex::new(source);
        let stripped = LineIndex::new(&output.code);
        let source_return = source.find("return").unwrap() as u32;
        let code_return = output.code.find("return").unwrap() as u32;
        assert_eq!(original.location(source_return).0, stripped.location(code_return).0);
    }

    #[test]
    fn test_columns_preserved_before_first_span() {
        let source = "let a: T = 1\n  const total = compute(x) as Total\n";
        let output = strip(source, &StripOptions::default());
        assert!(output.is_ok());
        let original = LineIndex::new(source);
        let stripped = LineIndex::new(&output.code);
        for word in ["const", "total", "compute", "x)"] {
            let before = original.location(source.find(word).unwrap() as u32);
            let after = stripped.location(output.code.find(word).unwrap() as u32);
            assert_eq!(before, after, "{word} moved");
        }
        // `let a` precedes the first span on its line.
        assert_eq!(output.code.find("let a"), source.find("let a"));
    }

    #[test]
    fn test_elided_span_text_recovers_types() {
        let source = "let a: Map<string, number> = new Map()";
        let output = strip(source, &StripOptions::default());
        let texts: Vec<_> = output.elided_spans.iter().map(|s| s.text(source)).collect();
        assert_eq!(texts, vec![": Map<string, number>"]);
        assert_eq!(output.elided_spans[0].context, SpanContext::VarType);
    }

    #[test]
    fn test_output_serializes() {
        let output = strip("let a: T", &StripOptions::default());
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["code"], "let a");
        assert_eq!(json["elided_spans"][0]["context"], "VarType");
    }
}
