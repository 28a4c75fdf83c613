//! Import clause filtering.
//!
//! `import { a, type B, c } from 'm'` keeps its value specifiers and loses
//! the type-only ones. Each removed specifier takes exactly one adjacent
//! comma with it so the list stays well-formed: the comma before it when
//! that one is still unclaimed, otherwise the comma after it together with
//! the whitespace up to the next specifier. Export lists follow the same
//! rules.

use crate::span::Span;

/// One entry of a `{ ... }` import or export list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSpecifier<'a> {
    /// Imported (or exported) name as written.
    pub name: &'a str,
    pub is_type_only: bool,
    /// The specifier including its `type` marker and `as` alias.
    pub span: Span,
    /// The comma following the specifier, if any.
    pub comma: Option<Span>,
    /// Start of the next token after the comma when only whitespace lies
    /// between, else the comma end.
    pub follow: u32,
}

/// The bindings an import statement introduces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportClause<'a> {
    pub default: Option<&'a str>,
    pub namespace: Option<&'a str>,
    pub specifiers: Vec<ImportSpecifier<'a>>,
}

/// What to remove from a statement carrying an import or export clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseElision {
    Keep,
    Specifiers(Vec<Span>),
    WholeStatement,
}

impl<'a> ImportClause<'a> {
    /// Whether anything survives at runtime once type-only specifiers are gone.
    #[must_use]
    pub fn has_runtime_bindings(&self) -> bool {
        self.default.is_some() || self.namespace.is_some() || self.specifiers.iter().any(|s| !s.is_type_only)
    }

    #[must_use]
    pub fn elision(&self) -> ClauseElision {
        if !self.specifiers.iter().any(|s| s.is_type_only) {
            ClauseElision::Keep
        } else if self.has_runtime_bindings() {
            ClauseElision::Specifiers(self.type_only_spans())
        } else {
            ClauseElision::WholeStatement
        }
    }

    fn type_only_spans(&self) -> Vec<Span> {
        let mut spans = Vec::new();
        // The comma before the current specifier, while nothing has claimed it.
        let mut free_comma: Option<Span> = None;
        for specifier in &self.specifiers {
            let next_free = specifier.comma;
            if specifier.is_type_only {
                if let Some(comma) = free_comma {
                    spans.push(Span::new(comma.start, specifier.span.end));
                    free_comma = next_free;
                    continue;
                }
                match specifier.comma {
                    Some(_) => {
                        spans.push(Span::new(specifier.span.start, specifier.follow));
                        free_comma = None;
                    }
                    None => spans.push(specifier.span),
                }
                continue;
            }
            free_comma = next_free;
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Specifiers for `{` + names joined by ", " + `}`; a leading `type `
    /// marks type-only entries.
    fn clause(entries: &[&'static str]) -> (String, ImportClause<'static>) {
        let mut text = String::from("{");
        let mut specifiers = Vec::new();
        for (i, &entry) in entries.iter().enumerate() {
            let start = text.len() as u32;
            text.push_str(entry);
            let end = text.len() as u32;
            let (is_type_only, name) = match entry.strip_prefix("type ") {
                Some(name) => (true, name),
                None => (false, entry),
            };
            let (comma, follow) = if i + 1 < entries.len() {
                let comma = Span::new(end, end + 1);
                text.push_str(", ");
                (Some(comma), end + 3)
            } else {
                (None, end)
            };
            specifiers.push(ImportSpecifier {
                name,
                is_type_only,
                span: Span::new(start, end),
                comma,
                follow,
            });
        }
        text.push('}');
        (text, ImportClause { default: None, namespace: None, specifiers })
    }

    fn apply(text: &str, elision: &ClauseElision) -> String {
        let ClauseElision::Specifiers(spans) = elision else {
            panic!("expected per-specifier elision, got {elision:?}");
        };
        let mut out = String::new();
        let mut last = 0;
        for span in spans {
            out.push_str(&text[last..span.start as usize]);
            last = span.end as usize;
        }
        out.push_str(&text[last..]);
        out
    }

    #[test]
    fn test_trailing_type_specifier_takes_preceding_comma() {
        let (text, clause) = clause(&["someFunction", "type someType"]);
        assert_eq!(apply(&text, &clause.elision()), "{someFunction}");
    }

    #[test]
    fn test_leading_type_specifiers_take_following_comma() {
        let (text, clause) = clause(&["type A", "type B", "c"]);
        assert_eq!(apply(&text, &clause.elision()), "{c}");
    }

    #[test]
    fn test_interleaved_specifiers() {
        let (text, clause) = clause(&["a", "type B", "c", "type D", "type E", "f"]);
        assert_eq!(apply(&text, &clause.elision()), "{a, c, f}");
    }

    #[test]
    fn test_all_type_only_elides_statement() {
        let (_, clause) = clause(&["type A", "type B"]);
        assert_eq!(clause.elision(), ClauseElision::WholeStatement);
    }

    #[test]
    fn test_default_keeps_statement() {
        let (text, mut clause) = clause(&["type A"]);
        clause.default = Some("D");
        assert_eq!(apply(&text, &clause.elision()), "{}");
    }

    #[test]
    fn test_no_type_specifiers_keeps_everything() {
        let (_, clause) = clause(&["a", "b"]);
        assert_eq!(clause.elision(), ClauseElision::Keep);
        let empty = ImportClause::default();
        assert_eq!(empty.elision(), ClauseElision::Keep);
    }
}
