//! Balanced-delimiter scanning over `( )`, `[ ]`, `{ }` and `< >`.
//!
//! A type's extent is found by matching the bracket group it starts with.
//! One stack is shared by the four kinds and only an exact-kind close pops
//! it. The stack lives for a single call.

use crate::error::StripError;
use crate::token::{Token, TokenKind};

/// The four delimiter kinds understood inside types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketKind {
    Paren,
    Square,
    Curly,
    Angle,
}

impl BracketKind {
    /// The kind opened by this token, if any.
    #[must_use]
    pub fn from_open(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::LParen => Some(Self::Paren),
            TokenKind::LBracket => Some(Self::Square),
            TokenKind::LBrace => Some(Self::Curly),
            TokenKind::Lt => Some(Self::Angle),
            _ => None,
        }
    }

    /// The kind closed by this token, if any.
    #[must_use]
    pub fn from_close(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::RParen => Some(Self::Paren),
            TokenKind::RBracket => Some(Self::Square),
            TokenKind::RBrace => Some(Self::Curly),
            TokenKind::Gt => Some(Self::Angle),
            _ => None,
        }
    }

    #[must_use]
    pub fn open_char(&self) -> char {
        match self {
            Self::Paren => '(',
            Self::Square => '[',
            Self::Curly => '{',
            Self::Angle => '<',
        }
    }

    #[must_use]
    pub fn close_char(&self) -> char {
        match self {
            Self::Paren => ')',
            Self::Square => ']',
            Self::Curly => '}',
            Self::Angle => '>',
        }
    }
}

/// An open delimiter waiting for its close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketFrame {
    pub kind: BracketKind,
    pub open_offset: u32,
}

/// How a failed scan is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// At a type site: every failure is a fatal error.
    Strict,
    /// Tentatively treating `<` as a generic clause: give up on the first
    /// token that cannot appear in a type.
    Speculative,
}

/// Why a scan did not produce a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanFailure {
    /// Speculative scan hit something that is not type syntax.
    NotAType,
    Error(StripError),
}

impl From<StripError> for ScanFailure {
    fn from(err: StripError) -> Self {
        Self::Error(err)
    }
}

/// Match the group opened at `tokens[start]`, returning the index of the
/// token after its close.
pub fn match_group(tokens: &[Token<'_>], start: usize, mode: ScanMode) -> Result<usize, ScanFailure> {
    let first = tokens[start];
    let Some(kind) = BracketKind::from_open(first.kind) else {
        if let Some(close) = BracketKind::from_close(first.kind) {
            return Err(StripError::UnterminatedBracket {
                offset: first.start(),
                delimiter: close.close_char(),
            }
            .into());
        }
        return Err(StripError::unexpected(first.start(), "expected a bracket group").into());
    };

    let mut stack = vec![BracketFrame { kind, open_offset: first.start() }];
    let mut i = start + 1;
    while let Some(token) = tokens.get(i) {
        if token.kind == TokenKind::Eof {
            break;
        }
        if mode == ScanMode::Speculative && is_foreign_to_types(token, &stack) {
            return Err(ScanFailure::NotAType);
        }

        if let Some(open) = BracketKind::from_open(token.kind) {
            stack.push(BracketFrame { kind: open, open_offset: token.start() });
        } else if let Some(close) = BracketKind::from_close(token.kind) {
            let top = stack[stack.len() - 1];
            if top.kind != close {
                if mode == ScanMode::Speculative {
                    return Err(ScanFailure::NotAType);
                }
                return Err(StripError::MismatchedBracketKind {
                    offset: top.open_offset,
                    open: top.kind.open_char(),
                    close: close.close_char(),
                    close_offset: token.start(),
                }
                .into());
            }
            stack.pop();
            if stack.is_empty() {
                return Ok(i + 1);
            }
        }
        i += 1;
    }

    if mode == ScanMode::Speculative {
        return Err(ScanFailure::NotAType);
    }
    let innermost = stack[stack.len() - 1];
    Err(StripError::UnterminatedBracket {
        offset: innermost.open_offset,
        delimiter: innermost.kind.open_char(),
    }
    .into())
}

/// Strict match that converts the failure into the fatal error.
pub fn match_group_strict(tokens: &[Token<'_>], start: usize) -> Result<usize, StripError> {
    match match_group(tokens, start, ScanMode::Strict) {
        Ok(end) => Ok(end),
        Err(ScanFailure::Error(err)) => Err(err),
        Err(ScanFailure::NotAType) => Err(StripError::unexpected(tokens[start].start(), "expected a type")),
    }
}

/// Speculative match of a `<...>` group; `None` means "not a generic clause".
#[must_use]
pub fn match_group_speculative(tokens: &[Token<'_>], start: usize) -> Option<usize> {
    match_group(tokens, start, ScanMode::Speculative).ok()
}

fn is_foreign_to_types(token: &Token<'_>, stack: &[BracketFrame]) -> bool {
    if token.kind.is_expression_only() {
        return true;
    }
    // A statement-terminating `;` directly inside `<...>`. Inside `{...}` it
    // separates object type members.
    token.kind == TokenKind::Semicolon
        && stack.last().is_some_and(|frame| frame.kind == BracketKind::Angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        Lexer::tokenize(source).unwrap()
    }

    #[test]
    fn test_matches_nested_groups() {
        let toks = tokens("<K, Array<V>> rest");
        let end = match_group_strict(&toks, 0).unwrap();
        assert_eq!(toks[end].text, "rest");
    }

    #[test]
    fn test_mismatch_reports_innermost_open() {
        let toks = tokens("(Foo<T) {}");
        let err = match_group_strict(&toks, 0).unwrap_err();
        assert_eq!(
            err,
            StripError::MismatchedBracketKind {
                offset: 4,
                open: '<',
                close: ')',
                close_offset: 6,
            }
        );
    }

    #[test]
    fn test_unterminated_reports_innermost_open() {
        let toks = tokens("{ a: [1, 2 ");
        let err = match_group_strict(&toks, 0).unwrap_err();
        assert_eq!(err, StripError::UnterminatedBracket { offset: 5, delimiter: '[' });
    }

    #[test]
    fn test_close_without_open() {
        let toks = tokens(") x");
        let err = match_group_strict(&toks, 0).unwrap_err();
        assert_eq!(err, StripError::UnterminatedBracket { offset: 0, delimiter: ')' });
    }

    #[test]
    fn test_speculative_rejects_comparison() {
        let toks = tokens("< b && c > (d)");
        assert_eq!(match_group_speculative(&toks, 0), None);
        let toks = tokens("< b; c > (d)");
        assert_eq!(match_group_speculative(&toks, 0), None);
    }

    #[test]
    fn test_speculative_allows_object_types() {
        let toks = tokens("<{ a: string; b: number }>(x)");
        let end = match_group_speculative(&toks, 0).unwrap();
        assert_eq!(toks[end].kind, TokenKind::LParen);
    }
}
