//! Type sites and whole-statement type declarations.

use super::Classifier;
use crate::bracket::{match_group_strict, BracketKind};
use crate::elision::SpanContext;
use crate::error::StripError;
use crate::token::{Token, TokenKind};

/// Where a type annotation appears. Each site has its own terminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeSite {
    /// Function, method and arrow parameters (and `catch` bindings).
    Param,
    /// Function and method return types.
    Return,
    /// Arrow function return types; only `=>` may follow.
    ArrowReturn,
    /// Variable declarators.
    Var,
    /// Class fields and index signatures.
    Field,
    /// The type after `as` or `satisfies`.
    As,
}

impl TypeSite {
    fn allows_optional(self) -> bool {
        self != TypeSite::As
    }

    fn is_terminated_by(self, next: &Token<'_>) -> bool {
        let line_end = next.newline_before || next.kind == TokenKind::Eof;
        match self {
            TypeSite::Param => matches!(next.kind, TokenKind::Comma | TokenKind::RParen | TokenKind::Eq),
            TypeSite::Return => {
                line_end || matches!(next.kind, TokenKind::LBrace | TokenKind::Semicolon | TokenKind::RBrace)
            }
            TypeSite::ArrowReturn => next.kind == TokenKind::Arrow && !next.newline_before,
            TypeSite::Var => {
                line_end
                    || matches!(
                        next.kind,
                        TokenKind::Eq
                            | TokenKind::Comma
                            | TokenKind::Semicolon
                            | TokenKind::RBrace
                            | TokenKind::RParen
                    )
            }
            TypeSite::Field => {
                line_end || matches!(next.kind, TokenKind::Eq | TokenKind::Semicolon | TokenKind::RBrace)
            }
            // Anything but another operand on the same line. A further `as`
            // or `satisfies` chains onto the same operand.
            TypeSite::As => {
                line_end
                    || (next.kind == TokenKind::Identifier && matches!(next.text, "as" | "satisfies"))
                    || !(next.is_word()
                        || matches!(
                            next.kind,
                            TokenKind::String
                                | TokenKind::Number
                                | TokenKind::BigInt
                                | TokenKind::Regex
                                | TokenKind::TemplateNoSub
                                | TokenKind::TemplateHead
                                | TokenKind::PrivateName
                        ))
            }
        }
    }
}

/// Tokens after which a line break does not end a type alias body.
fn continues_type(prev: &Token<'_>, next: &Token<'_>) -> bool {
    prev.kind.is_binary_operator()
        || prev.kind == TokenKind::Extends
        || matches!(
            next.kind,
            TokenKind::Pipe
                | TokenKind::Amp
                | TokenKind::Dot
                | TokenKind::Arrow
                | TokenKind::Question
                | TokenKind::Colon
                | TokenKind::Extends
        )
}

impl<'a> Classifier<'a> {
    /// Consume one type at `site` and return the offset just past it.
    ///
    /// A type is a (possibly dotted) name, with at most one `?` before or
    /// after it, optionally followed without whitespace by one bracket
    /// group; or a bracket group on its own. The site's terminator must come
    /// next.
    pub(crate) fn type_shape(&mut self, site: TypeSite) -> Result<u32, StripError> {
        let first = self.peek();
        if BracketKind::from_open(first.kind).is_some() {
            self.pos = match_group_strict(self.tokens, self.pos)?;
        } else {
            let prefix = site.allows_optional() && self.eat(TokenKind::Question);
            let name = self.peek();
            if !name.is_word() {
                return Err(self.unexpected_token(name, "expected a type"));
            }
            self.bump();
            while self.at(TokenKind::Dot) && self.peek_at(1).is_word() {
                self.bump();
                self.bump();
            }
            let group = self.peek();
            if BracketKind::from_open(group.kind).is_some() && group.start() == self.prev_end() {
                self.pos = match_group_strict(self.tokens, self.pos)?;
            }
            if !prefix && site.allows_optional() {
                self.eat(TokenKind::Question);
            }
        }

        let end = self.prev_end();
        let next = self.peek();
        if site.is_terminated_by(&next) {
            Ok(end)
        } else {
            Err(self.unexpected_token(next, "unexpected token after type"))
        }
    }

    /// `: Type` at `site`, recorded as one span starting at the colon.
    pub(crate) fn annotation(&mut self, site: TypeSite, context: SpanContext) -> Result<(), StripError> {
        let colon = self.bump();
        let end = self.type_shape(site)?;
        self.push(colon.start(), end, context);
        Ok(())
    }

    /// `<...>` directly after a declared name, recorded as a generic clause.
    pub(crate) fn generic_clause(&mut self) -> Result<(), StripError> {
        let open = self.peek();
        self.pos = match_group_strict(self.tokens, self.pos)?;
        self.push(open.start(), self.prev_end(), SpanContext::GenericClause);
        Ok(())
    }

    /// `type Name<...> = ...`, elided from `start` (which covers a leading
    /// `export`) through the end of the statement.
    pub(crate) fn type_alias(&mut self, start: u32) -> Result<(), StripError> {
        self.bump(); // `type`
        self.bump(); // name
        if self.at(TokenKind::Lt) {
            self.pos = match_group_strict(self.tokens, self.pos)?;
        }
        if !self.eat(TokenKind::Eq) {
            let token = self.peek();
            return Err(self.unexpected_token(token, "expected `=` in type alias"));
        }
        self.skip_type_body()?;
        self.push(start, self.prev_end(), SpanContext::TypeAliasBody);
        Ok(())
    }

    /// Scan an opaque type to the end of its statement.
    fn skip_type_body(&mut self) -> Result<(), StripError> {
        let body_start = self.pos;
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.bump();
                    break;
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => break,
                _ => {}
            }
            if token.newline_before && self.pos > body_start {
                if let Some(prev) = self.prev() {
                    if !continues_type(&prev, &token) {
                        break;
                    }
                }
            }
            if BracketKind::from_open(token.kind).is_some() {
                self.pos = match_group_strict(self.tokens, self.pos)?;
            } else {
                self.bump();
            }
        }
        if self.pos == body_start {
            let token = self.peek();
            return Err(self.unexpected_token(token, "expected a type"));
        }
        Ok(())
    }

    /// `interface Name<...> extends ... { ... }`, elided whole.
    pub(crate) fn interface(&mut self, start: u32) -> Result<(), StripError> {
        self.bump(); // `interface`
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::LBrace => break,
                TokenKind::Eof | TokenKind::Semicolon => {
                    return Err(self.unexpected_token(token, "expected interface body"));
                }
                _ if BracketKind::from_open(token.kind).is_some()
                    || BracketKind::from_close(token.kind).is_some() =>
                {
                    self.pos = match_group_strict(self.tokens, self.pos)?;
                }
                _ => {
                    self.bump();
                }
            }
        }
        self.pos = match_group_strict(self.tokens, self.pos)?;
        self.push(start, self.prev_end(), SpanContext::InterfaceBody);
        Ok(())
    }

    /// Whether the current `declare` starts an ambient statement.
    pub(crate) fn at_ambient_declare(&self) -> bool {
        if !self.at_ident("declare") || !self.next_on_same_line() {
            return false;
        }
        let next = self.peek_at(1);
        matches!(
            next.kind,
            TokenKind::Var | TokenKind::Let | TokenKind::Const | TokenKind::Function | TokenKind::Class | TokenKind::Enum
        ) || ["module", "namespace", "global", "type", "interface", "abstract", "async"]
            .iter()
            .any(|word| next.is_ident(word))
    }

    /// `declare ...` at statement level, elided whole.
    pub(crate) fn ambient_declaration(&mut self, start: u32) -> Result<(), StripError> {
        self.bump(); // `declare`
        let keyword = self.peek();
        let block_bodied = matches!(keyword.kind, TokenKind::Class | TokenKind::Enum)
            || ["module", "namespace", "global", "interface", "abstract"]
                .iter()
                .any(|word| keyword.is_ident(word));
        let body_start = self.pos;
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.bump();
                    break;
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => break,
                _ => {}
            }
            if token.newline_before && self.pos > body_start {
                if let Some(prev) = self.prev() {
                    if !continues_type(&prev, &token) {
                        break;
                    }
                }
            }
            if token.kind == TokenKind::LBrace && block_bodied {
                self.pos = match_group_strict(self.tokens, self.pos)?;
                break;
            }
            if BracketKind::from_open(token.kind).is_some() {
                self.pos = match_group_strict(self.tokens, self.pos)?;
            } else {
                self.bump();
            }
        }
        self.push(start, self.prev_end(), SpanContext::AmbientDeclaration);
        Ok(())
    }
}
