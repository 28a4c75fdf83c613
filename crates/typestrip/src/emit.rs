//! Output emission.
//!
//! The original buffer is replayed with every elided span replaced by just the
//! line terminators it contained. Nothing is padded, so tokens after a span on
//! the same line move left by the removed width, but every retained token
//! stays on its original line.

use crate::elision::ElidedSpan;

/// Rebuild `source` without the bytes covered by `spans`.
///
/// `spans` must be sorted by start offset and non-overlapping.
#[must_use]
pub fn emit(source: &str, spans: &[ElidedSpan]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for span in spans {
        let start = span.start as usize;
        let end = span.end as usize;
        debug_assert!(start >= cursor && end <= source.len(), "spans must be sorted and in bounds");
        out.push_str(&source[cursor..start]);
        push_line_terminators(&mut out, &source[start..end]);
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Append each line terminator found in `removed`: `\n`, `\r\n`, a lone
/// `\r`, and the U+2028 / U+2029 separators JavaScript also counts as line
/// breaks.
fn push_line_terminators(out: &mut String, removed: &str) {
    let mut chars = removed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                out.push('\r');
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    out.push('\n');
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => out.push(c),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elision::SpanContext;
    use crate::span::Span;

    fn elide(source: &str, ranges: &[(u32, u32)]) -> String {
        let spans: Vec<_> = ranges
            .iter()
            .map(|&(start, end)| ElidedSpan::new(Span::new(start, end), SpanContext::TypeAliasBody))
            .collect();
        emit(source, &spans)
    }

    #[test]
    fn test_no_spans_is_identity() {
        assert_eq!(elide("let a = 1;\n", &[]), "let a = 1;\n");
    }

    #[test]
    fn test_same_line_span_shifts_columns() {
        assert_eq!(elide("let a: T = 1", &[(5, 8)]), "let a = 1");
    }

    #[test]
    fn test_multiline_span_keeps_newlines() {
        let source = "type A = {\n  x: 1\n}\nlet b";
        assert_eq!(elide(source, &[(0, 19)]), "\n\n\nlet b");
    }

    #[test]
    fn test_crlf_and_lone_cr_are_kept() {
        assert_eq!(elide("a\r\nb\rc", &[(0, 6)]), "\r\n\r");
    }

    #[test]
    fn test_adjacent_spans() {
        assert_eq!(elide("abcdef", &[(1, 2), (2, 4)]), "aef");
    }
}
