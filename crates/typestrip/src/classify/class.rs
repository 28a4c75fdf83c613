//! Class declarations and expressions.

use super::expr::{is_property_key, ExprEnd};
use super::{Classifier, TypeSite};
use crate::bracket::{match_group_strict, BracketKind};
use crate::elision::SpanContext;
use crate::error::StripError;
use crate::grouper::{FunctionHead, Grouper, Statement};
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Member modifier keywords. None of them exists at runtime.
const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "readonly",
    "override",
    "abstract",
    "declare",
];

pub(crate) fn is_modifier(token: &Token<'_>) -> bool {
    token.kind == TokenKind::Identifier && MODIFIERS.contains(&token.text)
}

impl<'a> Classifier<'a> {
    /// `class Name<...> extends Base<...> implements I { ... }`.
    pub(crate) fn class(&mut self) -> Result<(), StripError> {
        self.bump(); // `class`
        let name = self.peek();
        let anonymous_implements = name.is_ident("implements") && self.peek_at(1).is_word();
        if name.kind == TokenKind::Identifier && !anonymous_implements {
            self.bump();
        }
        if self.at(TokenKind::Lt) {
            self.generic_clause()?;
        }
        if self.eat(TokenKind::Extends) {
            self.heritage()?;
        }
        if self.at_ident("implements") {
            let start = self.peek().start();
            self.bump();
            while !self.at(TokenKind::LBrace) {
                let token = self.peek();
                if token.kind == TokenKind::Eof {
                    return Err(self.unexpected_token(token, "expected class body"));
                }
                if BracketKind::from_open(token.kind).is_some() || BracketKind::from_close(token.kind).is_some() {
                    self.pos = match_group_strict(self.tokens, self.pos)?;
                } else {
                    self.bump();
                }
            }
            self.push(start, self.prev_end(), SpanContext::ImplementsClause);
        }
        self.class_body()
    }

    /// The expression after `extends`, with type arguments elided.
    fn heritage(&mut self) -> Result<(), StripError> {
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::LBrace | TokenKind::Eof => return Ok(()),
                _ if token.is_ident("implements") => return Ok(()),
                TokenKind::Lt => self.generic_clause()?,
                TokenKind::LParen => {
                    let open = self.bump();
                    self.expression(ExprEnd::GROUP)?;
                    self.expect_close(open, BracketKind::Paren)?;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn class_body(&mut self) -> Result<(), StripError> {
        let open = self.peek();
        if open.kind != TokenKind::LBrace {
            return Err(self.unexpected_token(open, "expected class body"));
        }
        self.bump();
        let mut grouper = Grouper::default();
        loop {
            let token = self.peek();
            if token.kind == TokenKind::Eof || BracketKind::from_close(token.kind).is_some() {
                break;
            }
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            let mark = self.spans.len();
            let function = self.class_member()?;
            let statement = Statement {
                span: Span::new(token.start(), self.prev_end()),
                mark,
                function,
            };
            grouper.observe(statement, &mut self.spans)?;
        }
        grouper.finish(&mut self.spans);
        self.expect_close(open, BracketKind::Curly)?;
        Ok(())
    }

    /// Whether the current word is a prefix (modifier, `static`, accessor
    /// keyword) rather than the member name itself.
    fn at_member_prefix(&self) -> bool {
        let next = self.peek_at(1);
        self.next_on_same_line() && (is_property_key(&next) || next.kind == TokenKind::Star)
    }

    fn class_member(&mut self) -> Result<Option<FunctionHead<'a>>, StripError> {
        while self.at(TokenKind::At) {
            self.decorator()?;
        }

        loop {
            let token = self.peek();
            if is_modifier(&token) && self.at_member_prefix() {
                if !self.options.modifiers_enabled() {
                    return Err(StripError::unexpected(
                        token.start(),
                        format!("`{}` modifier requires modifier syntax to be enabled", token.text),
                    ));
                }
                if token.text == "declare" {
                    self.ambient_member()?;
                    return Ok(None);
                }
                self.bump();
                self.push(token.start(), token.end(), SpanContext::ModifierKeyword);
                continue;
            }
            if token.is_ident("static") {
                // `static { ... }` initialization block.
                if self.peek_at(1).kind == TokenKind::LBrace {
                    self.bump();
                    self.block()?;
                    return Ok(None);
                }
                if self.at_member_prefix() {
                    self.bump();
                    continue;
                }
            }
            if token.is_ident("accessor") && self.at_member_prefix() {
                self.bump();
                continue;
            }
            break;
        }
        while self.at_accessor_prefix() {
            self.bump();
        }

        if self.at_index_signature() {
            return self.index_signature().map(|()| None);
        }

        let name = self.property_key()?;
        if self.at(TokenKind::Question) {
            let marker = self.bump();
            self.push(marker.start(), marker.end(), SpanContext::OptionalMarker);
        }

        if self.at(TokenKind::Lt) || self.at(TokenKind::LParen) {
            let bodied = self.method_tail()?;
            return Ok(Some(FunctionHead {
                name: Some(name),
                bodied,
            }));
        }

        if self.at(TokenKind::Bang) {
            self.definite_assignment()?;
        }
        if self.at(TokenKind::Colon) {
            self.annotation(TypeSite::Field, SpanContext::FieldType)?;
        }
        if self.eat(TokenKind::Eq) {
            self.expression(ExprEnd::STATEMENT)?;
        }
        let next = self.peek();
        match next.kind {
            TokenKind::Semicolon => {
                self.bump();
            }
            TokenKind::RBrace | TokenKind::Eof => {}
            _ if next.newline_before => {}
            _ => return Err(self.unexpected_token(next, "expected `;` after class field")),
        }
        Ok(None)
    }

    /// `x!: T`: the `!` is elided only with postfix non-null syntax enabled.
    pub(crate) fn definite_assignment(&mut self) -> Result<(), StripError> {
        let bang = self.peek();
        if !self.options.non_null_enabled() {
            return Err(StripError::unexpected(
                bang.start(),
                "definite assignment `!` requires non-null syntax to be enabled",
            ));
        }
        if self.peek_at(1).kind != TokenKind::Colon {
            return Err(self.unexpected_token(self.peek_at(1), "expected `:` after `!`"));
        }
        self.bump();
        self.push(bang.start(), bang.end(), SpanContext::NonNullAssertion);
        Ok(())
    }

    fn at_index_signature(&self) -> bool {
        self.at(TokenKind::LBracket) && self.peek_at(1).is_word() && self.peek_at(2).kind == TokenKind::Colon
    }

    /// `[key: K]: V;`, elided whole.
    fn index_signature(&mut self) -> Result<(), StripError> {
        let open = self.peek();
        self.pos = match_group_strict(self.tokens, self.pos)?;
        if !self.at(TokenKind::Colon) {
            let token = self.peek();
            return Err(self.unexpected_token(token, "expected `:` after index signature"));
        }
        self.bump();
        self.type_shape(TypeSite::Field)?;
        self.eat_semicolon();
        self.push(open.start(), self.prev_end(), SpanContext::FieldType);
        Ok(())
    }

    /// `declare field: T;` on a class member, elided whole together with any
    /// modifiers between `declare` and the name.
    fn ambient_member(&mut self) -> Result<(), StripError> {
        let start = self.bump().start();
        loop {
            let token = self.peek();
            if (is_modifier(&token) || token.is_ident("static")) && self.at_member_prefix() {
                self.bump();
            } else {
                break;
            }
        }
        self.property_key()?;
        self.eat(TokenKind::Question);
        self.eat(TokenKind::Bang);
        if self.at(TokenKind::Colon) {
            self.bump();
            self.type_shape(TypeSite::Field)?;
        }
        self.eat_semicolon();
        self.push(start, self.prev_end(), SpanContext::AmbientDeclaration);
        Ok(())
    }
}
