//! Context classifier.
//!
//! Walks the token stream at statement and clause granularity and records
//! every byte range that is type syntax. It is not a full parser: expressions
//! are walked flat, tracking only whether an operand or an operator is
//! expected next, which is enough to tell a generic clause from `<`, a
//! non-null `!` from a prefix `!`, and an arrow parameter list from a
//! parenthesized expression.
//!
//! Split across files as `impl<'a> Classifier<'a>` blocks:
//! - `stmt.rs`: statements, declarations, imports and exports
//! - `expr.rs`: expressions, parameters, binding patterns
//! - `class.rs`: class headers and bodies
//! - `types.rs`: type shapes and whole-statement type declarations

mod class;
mod expr;
mod stmt;
mod types;

use crate::bracket::BracketKind;
use crate::elision::{ElidedSpan, SpanContext};
use crate::error::StripError;
use crate::grouper::{Grouper, Statement};
use crate::options::StripOptions;
use crate::span::Span;
use crate::token::{Token, TokenKind};

pub(crate) use types::TypeSite;

/// Classify every type span in `tokens`. The returned spans are sorted and
/// never overlap.
pub(crate) fn classify<'a>(
    source: &'a str,
    tokens: &'a [Token<'a>],
    options: StripOptions,
) -> Result<Vec<ElidedSpan>, StripError> {
    let mut classifier = Classifier::new(source, tokens, options);
    classifier.program()?;
    let mut spans = classifier.spans;
    spans.sort_by_key(|span| span.start);
    debug_assert!(spans.windows(2).all(|w| w[0].end <= w[1].start));
    Ok(spans)
}

/// Saved cursor state for speculative parsing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    pos: usize,
    spans: usize,
}

pub(crate) struct Classifier<'a> {
    pub(crate) source: &'a str,
    pub(crate) tokens: &'a [Token<'a>],
    pub(crate) pos: usize,
    pub(crate) options: StripOptions,
    pub(crate) spans: Vec<ElidedSpan>,
}

impl<'a> Classifier<'a> {
    pub(crate) fn new(source: &'a str, tokens: &'a [Token<'a>], options: StripOptions) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            options,
            spans: Vec::new(),
        }
    }

    // =========================================================================
    // Token Handling
    // =========================================================================

    /// The current token. The stream always ends with `Eof`, which is never
    /// consumed.
    pub(crate) fn peek(&self) -> Token<'a> {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// The token `n` positions ahead of the current one.
    pub(crate) fn peek_at(&self, n: usize) -> Token<'a> {
        self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn at_ident(&self, name: &str) -> bool {
        self.peek().is_ident(name)
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Advance and return the consumed token.
    pub(crate) fn bump(&mut self) -> Token<'a> {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// End offset of the last consumed token.
    pub(crate) fn prev_end(&self) -> u32 {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].end()
        }
    }

    pub(crate) fn prev(&self) -> Option<Token<'a>> {
        self.pos.checked_sub(1).map(|i| self.tokens[i])
    }

    /// Whether the next token sits on the same line as the current one.
    pub(crate) fn next_on_same_line(&self) -> bool {
        !self.peek_at(1).newline_before
    }

    /// Consume the close matching `open`, or fail with the bracket error that
    /// describes what was found instead.
    pub(crate) fn expect_close(&mut self, open: Token<'a>, kind: BracketKind) -> Result<Token<'a>, StripError> {
        let token = self.peek();
        if BracketKind::from_close(token.kind) == Some(kind) {
            return Ok(self.bump());
        }
        match BracketKind::from_close(token.kind) {
            _ if token.kind == TokenKind::Eof => Err(StripError::UnterminatedBracket {
                offset: open.start(),
                delimiter: kind.open_char(),
            }),
            Some(close) if close != BracketKind::Angle => Err(StripError::MismatchedBracketKind {
                offset: open.start(),
                open: kind.open_char(),
                close: close.close_char(),
                close_offset: token.start(),
            }),
            _ => Err(self.unexpected_token(token, &format!("expected `{}`", kind.close_char()))),
        }
    }

    pub(crate) fn unexpected_token(&self, token: Token<'a>, expected: &str) -> StripError {
        if token.kind == TokenKind::Eof {
            StripError::unexpected(token.start(), format!("{expected}, found end of input"))
        } else {
            StripError::unexpected(token.start(), format!("{expected}, found `{}`", token.text))
        }
    }

    /// Optional statement terminator.
    pub(crate) fn eat_semicolon(&mut self) {
        self.eat(TokenKind::Semicolon);
    }

    /// Offset where a removal that swallows the whitespace after `end` may
    /// stop: the start of the next token when only whitespace lies between.
    pub(crate) fn whitespace_end(&self, end: u32) -> u32 {
        let next = self.peek().start();
        let gap = &self.source[end as usize..next as usize];
        if gap.chars().all(char::is_whitespace) {
            next
        } else {
            end
        }
    }

    // =========================================================================
    // Spans
    // =========================================================================

    pub(crate) fn push(&mut self, start: u32, end: u32, context: SpanContext) {
        if end > start {
            self.spans.push(ElidedSpan::new(Span::new(start, end), context));
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            spans: self.spans.len(),
        }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.spans.truncate(checkpoint.spans);
    }

    // =========================================================================
    // Statement Lists
    // =========================================================================

    fn program(&mut self) -> Result<(), StripError> {
        let mut grouper = Grouper::default();
        while !self.is_eof() {
            let token = self.peek();
            if let Some(close) = BracketKind::from_close(token.kind) {
                return Err(StripError::UnterminatedBracket {
                    offset: token.start(),
                    delimiter: close.close_char(),
                });
            }
            self.grouped_statement(&mut grouper)?;
        }
        grouper.finish(&mut self.spans);
        Ok(())
    }

    /// Statements up to (not including) the `}` closing a block.
    pub(crate) fn statement_list(&mut self) -> Result<(), StripError> {
        let mut grouper = Grouper::default();
        while !self.at(TokenKind::RBrace) && !self.is_eof() {
            self.grouped_statement(&mut grouper)?;
        }
        grouper.finish(&mut self.spans);
        Ok(())
    }

    /// A statement in a position that holds exactly one (`if` branches,
    /// loop bodies, labels).
    pub(crate) fn embedded_statement(&mut self) -> Result<(), StripError> {
        let mut grouper = Grouper::default();
        self.grouped_statement(&mut grouper)?;
        grouper.finish(&mut self.spans);
        Ok(())
    }

    pub(crate) fn grouped_statement(&mut self, grouper: &mut Grouper<'a>) -> Result<(), StripError> {
        let mark = self.spans.len();
        let start_pos = self.pos;
        let start = self.peek().start();
        let function = self.statement()?;
        if self.pos == start_pos {
            let token = self.peek();
            return Err(self.unexpected_token(token, "expected a statement"));
        }
        let statement = Statement {
            span: Span::new(start, self.prev_end()),
            mark,
            function,
        };
        grouper.observe(statement, &mut self.spans)
    }

    /// `{ ... }` block body.
    pub(crate) fn block(&mut self) -> Result<(), StripError> {
        let open = self.peek();
        if open.kind != TokenKind::LBrace {
            return Err(self.unexpected_token(open, "expected `{`"));
        }
        self.bump();
        self.statement_list()?;
        self.expect_close(open, BracketKind::Curly)?;
        Ok(())
    }
}
