//! Declaration grouping.
//!
//! A function statement without a body is either one signature of an
//! overload group or an ambient declaration, and which one is only known
//! once the next statement has been seen. The grouper holds at most one such
//! signature. When it is resolved, the spans recorded inside it are replaced
//! by a single span covering the whole statement.

use crate::elision::{ElidedSpan, SpanContext};
use crate::error::StripError;
use crate::span::Span;

/// The head of a function statement or method, as seen by the grouper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FunctionHead<'a> {
    /// Source text of the name; `None` for anonymous functions.
    pub name: Option<&'a str>,
    pub bodied: bool,
}

/// A statement (or class member) just walked by the classifier.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Statement<'a> {
    /// Whole statement, including a leading `export` and trailing `;`.
    pub span: Span,
    /// Number of recorded spans before the statement started.
    pub mark: usize,
    pub function: Option<FunctionHead<'a>>,
}

#[derive(Debug, Clone, Copy)]
struct Pending<'a> {
    name: Option<&'a str>,
    span: Span,
    mark: usize,
    end_mark: usize,
}

/// One-statement lookahead over a statement list or class body.
#[derive(Debug, Default)]
pub(crate) struct Grouper<'a> {
    pending: Option<Pending<'a>>,
    /// Name of the previous statement when it was a bodied function.
    last_bodied: Option<&'a str>,
}

impl<'a> Grouper<'a> {
    pub(crate) fn observe(&mut self, statement: Statement<'a>, spans: &mut Vec<ElidedSpan>) -> Result<(), StripError> {
        let mut mark = statement.mark;
        if let Some(pending) = self.pending.take() {
            let same_name = match (pending.name, statement.function) {
                (Some(name), Some(head)) => head.name == Some(name),
                _ => false,
            };
            let context = if same_name {
                SpanContext::OverloadSignature
            } else {
                SpanContext::AmbientDeclaration
            };
            let removed = resolve(pending, context, spans);
            mark = mark + 1 - removed;
        }
        let end_mark = spans.len();

        match statement.function {
            Some(head) if !head.bodied => {
                if let (Some(previous), Some(name)) = (self.last_bodied, head.name) {
                    if previous == name {
                        return Err(StripError::InvalidOverloadGroup {
                            offset: statement.span.start,
                            name: name.to_string(),
                            message: "signature follows the implementation".to_string(),
                        });
                    }
                }
                self.pending = Some(Pending {
                    name: head.name,
                    span: statement.span,
                    mark,
                    end_mark,
                });
                self.last_bodied = None;
            }
            Some(head) => self.last_bodied = head.name,
            None => self.last_bodied = None,
        }
        Ok(())
    }

    /// End of the statement list: a signature still pending has no
    /// implementation after it.
    pub(crate) fn finish(self, spans: &mut Vec<ElidedSpan>) {
        if let Some(pending) = self.pending {
            resolve(pending, SpanContext::AmbientDeclaration, spans);
        }
    }
}

/// Replace the pending statement's inner spans with one whole-statement span.
/// Returns how many spans were removed.
fn resolve(pending: Pending<'_>, context: SpanContext, spans: &mut Vec<ElidedSpan>) -> usize {
    let removed = pending.end_mark - pending.mark;
    spans.splice(
        pending.mark..pending.end_mark,
        [ElidedSpan::new(pending.span, context)],
    );
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(name: &str, bodied: bool) -> Option<FunctionHead<'_>> {
        Some(FunctionHead { name: Some(name), bodied })
    }

    fn span(start: u32, end: u32, context: SpanContext) -> ElidedSpan {
        ElidedSpan::new(Span::new(start, end), context)
    }

    #[test]
    fn test_overload_replaces_inner_spans() {
        let mut spans = vec![span(14, 22, SpanContext::ParamType), span(23, 31, SpanContext::ReturnType)];
        let mut grouper = Grouper::default();
        grouper
            .observe(Statement { span: Span::new(0, 31), mark: 0, function: head("foo", false) }, &mut spans)
            .unwrap();
        spans.push(span(46, 54, SpanContext::ParamType));
        grouper
            .observe(Statement { span: Span::new(32, 70), mark: 2, function: head("foo", true) }, &mut spans)
            .unwrap();
        grouper.finish(&mut spans);

        assert_eq!(
            spans,
            vec![span(0, 31, SpanContext::OverloadSignature), span(46, 54, SpanContext::ParamType)]
        );
    }

    #[test]
    fn test_trailing_signature_is_ambient() {
        let mut spans = vec![span(5, 9, SpanContext::ReturnType)];
        let mut grouper = Grouper::default();
        grouper
            .observe(Statement { span: Span::new(0, 10), mark: 0, function: head("f", false) }, &mut spans)
            .unwrap();
        grouper.finish(&mut spans);
        assert_eq!(spans, vec![span(0, 10, SpanContext::AmbientDeclaration)]);
    }

    #[test]
    fn test_chain_of_signatures() {
        let mut spans = Vec::new();
        let mut grouper = Grouper::default();
        for (i, bodied) in [false, false, true].into_iter().enumerate() {
            let start = i as u32 * 10;
            let mark = spans.len();
            grouper
                .observe(
                    Statement { span: Span::new(start, start + 9), mark, function: head("f", bodied) },
                    &mut spans,
                )
                .unwrap();
        }
        grouper.finish(&mut spans);
        assert_eq!(
            spans,
            vec![span(0, 9, SpanContext::OverloadSignature), span(10, 19, SpanContext::OverloadSignature)]
        );
    }

    #[test]
    fn test_signature_after_implementation() {
        let mut spans = Vec::new();
        let mut grouper = Grouper::default();
        grouper
            .observe(Statement { span: Span::new(0, 10), mark: 0, function: head("f", true) }, &mut spans)
            .unwrap();
        let err = grouper
            .observe(Statement { span: Span::new(11, 20), mark: 0, function: head("f", false) }, &mut spans)
            .unwrap_err();
        assert!(matches!(err, StripError::InvalidOverloadGroup { offset: 11, .. }));
    }
}
