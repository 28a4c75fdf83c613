//! Statements, declarations, imports and exports.

use super::expr::ExprEnd;
use super::{Classifier, TypeSite};
use crate::bracket::{match_group_strict, BracketKind};
use crate::elision::SpanContext;
use crate::error::StripError;
use crate::grouper::{FunctionHead, Grouper};
use crate::imports::{ClauseElision, ImportClause, ImportSpecifier};
use crate::span::Span;
use crate::token::TokenKind;

impl<'a> Classifier<'a> {
    /// Walk one statement. Function declarations report their head so the
    /// caller can group overload signatures.
    pub(crate) fn statement(&mut self) -> Result<Option<FunctionHead<'a>>, StripError> {
        let token = self.peek();
        let start = token.start();
        match token.kind {
            TokenKind::Semicolon => {
                self.bump();
            }
            TokenKind::LBrace => self.block()?,
            TokenKind::If => {
                self.bump();
                self.paren_condition()?;
                self.embedded_statement()?;
                if self.eat(TokenKind::Else) {
                    self.embedded_statement()?;
                }
            }
            TokenKind::While | TokenKind::With => {
                self.bump();
                self.paren_condition()?;
                self.embedded_statement()?;
            }
            TokenKind::Do => {
                self.bump();
                self.embedded_statement()?;
                if !self.eat(TokenKind::While) {
                    let token = self.peek();
                    return Err(self.unexpected_token(token, "expected `while`"));
                }
                self.paren_condition()?;
                self.eat_semicolon();
            }
            TokenKind::For => self.for_statement()?,
            TokenKind::Return | TokenKind::Throw => {
                self.bump();
                let next = self.peek();
                if !next.newline_before
                    && !matches!(next.kind, TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof)
                {
                    self.expression(ExprEnd::STATEMENT)?;
                }
                self.eat_semicolon();
            }
            TokenKind::Break | TokenKind::Continue => {
                self.bump();
                if self.peek().kind == TokenKind::Identifier && !self.peek().newline_before {
                    self.bump();
                }
                self.eat_semicolon();
            }
            TokenKind::Try => self.try_statement()?,
            TokenKind::Switch => self.switch_statement()?,
            TokenKind::Debugger => {
                self.bump();
                self.eat_semicolon();
            }
            TokenKind::Import if !matches!(self.peek_at(1).kind, TokenKind::LParen | TokenKind::Dot) => {
                self.import_declaration(start)?;
            }
            TokenKind::Export => return self.export_declaration(start),
            TokenKind::At => {
                while self.at(TokenKind::At) {
                    self.decorator()?;
                }
                return self.statement();
            }
            _ => return self.declaration(start),
        }
        Ok(None)
    }

    /// Declarations that may follow `export`, plus labels and expression
    /// statements.
    fn declaration(&mut self, start: u32) -> Result<Option<FunctionHead<'a>>, StripError> {
        let token = self.peek();
        let next = self.peek_at(1);
        let same_line = self.next_on_same_line();
        match token.kind {
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                if token.kind == TokenKind::Const && next.kind == TokenKind::Enum {
                    return Err(StripError::unexpected(start, "`const enum` generates code"));
                }
                self.var_declaration(ExprEnd::INITIALIZER)?;
                self.eat_semicolon();
            }
            TokenKind::Function => return self.function().map(Some),
            TokenKind::Class => self.class()?,
            TokenKind::Enum => return Err(StripError::unexpected(start, "`enum` generates code")),
            TokenKind::Identifier => {
                if token.text == "async" && next.kind == TokenKind::Function && same_line {
                    self.bump();
                    return self.function().map(Some);
                }
                if token.text == "type"
                    && next.kind == TokenKind::Identifier
                    && same_line
                    && matches!(self.peek_at(2).kind, TokenKind::Eq | TokenKind::Lt)
                {
                    self.type_alias(start)?;
                } else if token.text == "interface" && next.kind == TokenKind::Identifier && same_line {
                    self.interface(start)?;
                } else if self.at_ambient_declare() {
                    self.ambient_declaration(start)?;
                } else if token.text == "abstract" && next.kind == TokenKind::Class && same_line {
                    self.abstract_class()?;
                } else if (token.text == "namespace" || token.text == "module")
                    && matches!(next.kind, TokenKind::Identifier | TokenKind::String)
                    && same_line
                {
                    return Err(StripError::unexpected(
                        start,
                        format!("non-ambient `{}` generates code", token.text),
                    ));
                } else if next.kind == TokenKind::Colon {
                    // Label.
                    self.bump();
                    self.bump();
                    self.embedded_statement()?;
                } else {
                    self.expression_statement()?;
                }
            }
            _ => self.expression_statement()?,
        }
        Ok(None)
    }

    fn expression_statement(&mut self) -> Result<(), StripError> {
        self.expression(ExprEnd::STATEMENT)?;
        self.eat_semicolon();
        Ok(())
    }

    /// `abstract class ...` at statement level.
    fn abstract_class(&mut self) -> Result<(), StripError> {
        let keyword = self.peek();
        if !self.options.modifiers_enabled() {
            return Err(StripError::unexpected(
                keyword.start(),
                "`abstract` modifier requires modifier syntax to be enabled",
            ));
        }
        self.bump();
        self.push(keyword.start(), keyword.end(), SpanContext::ModifierKeyword);
        self.class()
    }

    /// `var`/`let`/`const` and its declarators.
    pub(crate) fn var_declaration(&mut self, end: ExprEnd) -> Result<(), StripError> {
        self.bump();
        loop {
            self.binding()?;
            if self.at(TokenKind::Bang) {
                self.definite_assignment()?;
            }
            if self.at(TokenKind::Colon) {
                self.annotation(TypeSite::Var, SpanContext::VarType)?;
            }
            if self.eat(TokenKind::Eq) {
                self.expression(end)?;
            }
            if !self.eat(TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    fn paren_condition(&mut self) -> Result<(), StripError> {
        let open = self.peek();
        if open.kind != TokenKind::LParen {
            return Err(self.unexpected_token(open, "expected `(`"));
        }
        self.bump();
        self.expression(ExprEnd::GROUP)?;
        self.expect_close(open, BracketKind::Paren)?;
        Ok(())
    }

    fn for_statement(&mut self) -> Result<(), StripError> {
        self.bump(); // `for`
        self.eat(TokenKind::Await);
        let open = self.peek();
        if open.kind != TokenKind::LParen {
            return Err(self.unexpected_token(open, "expected `(`"));
        }
        self.bump();
        if matches!(self.peek().kind, TokenKind::Var | TokenKind::Let | TokenKind::Const) {
            self.var_declaration(ExprEnd::LIST_ITEM)?;
        }
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => break,
                _ if BracketKind::from_close(token.kind).is_some() => break,
                TokenKind::Semicolon | TokenKind::In => {
                    self.bump();
                }
                _ if token.is_ident("of") => {
                    self.bump();
                }
                _ => {
                    let before = self.pos;
                    self.expression(ExprEnd::GROUP)?;
                    if self.pos == before {
                        return Err(self.unexpected_token(token, "expected `)`"));
                    }
                }
            }
        }
        self.expect_close(open, BracketKind::Paren)?;
        self.embedded_statement()
    }

    fn try_statement(&mut self) -> Result<(), StripError> {
        self.bump(); // `try`
        self.block()?;
        if self.eat(TokenKind::Catch) {
            if self.at(TokenKind::LParen) {
                let open = self.bump();
                self.binding()?;
                if self.at(TokenKind::Colon) {
                    self.annotation(TypeSite::Param, SpanContext::ParamType)?;
                }
                self.expect_close(open, BracketKind::Paren)?;
            }
            self.block()?;
        }
        if self.eat(TokenKind::Finally) {
            self.block()?;
        }
        Ok(())
    }

    fn switch_statement(&mut self) -> Result<(), StripError> {
        self.bump(); // `switch`
        self.paren_condition()?;
        let open = self.peek();
        if open.kind != TokenKind::LBrace {
            return Err(self.unexpected_token(open, "expected `{`"));
        }
        self.bump();
        let mut grouper = Grouper::default();
        loop {
            let token = self.peek();
            if token.kind == TokenKind::Eof || BracketKind::from_close(token.kind).is_some() {
                break;
            }
            if matches!(token.kind, TokenKind::Case | TokenKind::Default) {
                std::mem::take(&mut grouper).finish(&mut self.spans);
                self.bump();
                if token.kind == TokenKind::Case {
                    self.expression(ExprEnd::GROUP)?;
                }
                if !self.eat(TokenKind::Colon) {
                    let token = self.peek();
                    return Err(self.unexpected_token(token, "expected `:`"));
                }
                continue;
            }
            self.grouped_statement(&mut grouper)?;
        }
        grouper.finish(&mut self.spans);
        self.expect_close(open, BracketKind::Curly)?;
        Ok(())
    }

    // =========================================================================
    // Modules
    // =========================================================================

    fn import_declaration(&mut self, start: u32) -> Result<(), StripError> {
        self.bump(); // `import`
        if self.eat(TokenKind::String) {
            self.module_attributes()?;
            self.eat_semicolon();
            return Ok(());
        }

        // `import type from 'm'` imports a default binding named `type`.
        let type_only = self.at_ident("type") && {
            let next = self.peek_at(1);
            matches!(next.kind, TokenKind::LBrace | TokenKind::Star)
                || (next.is_word() && !(next.is_ident("from") && self.peek_at(2).kind == TokenKind::String))
        };
        if type_only {
            self.bump();
        }

        let mut clause = ImportClause::default();
        let mut has_list = false;
        let token = self.peek();
        if token.is_word() {
            self.bump();
            clause.default = Some(token.text);
            if self.at(TokenKind::Eq) {
                return Err(StripError::unexpected(start, "import assignment generates code"));
            }
            self.eat(TokenKind::Comma);
        }
        if self.eat(TokenKind::Star) {
            if !self.at_ident("as") {
                let token = self.peek();
                return Err(self.unexpected_token(token, "expected `as`"));
            }
            self.bump();
            let name = self.peek();
            if !name.is_word() {
                return Err(self.unexpected_token(name, "expected namespace binding"));
            }
            self.bump();
            clause.namespace = Some(name.text);
        } else if self.at(TokenKind::LBrace) {
            has_list = true;
            clause.specifiers = self.specifier_list(type_only)?;
        }
        if type_only && clause.default.is_some() && (has_list || clause.namespace.is_some()) {
            return Err(StripError::InvalidImportTypeMix {
                offset: start,
                message: "a type-only import cannot mix a default import with named bindings".to_string(),
            });
        }

        self.module_source()?;
        if type_only {
            self.push(start, self.prev_end(), SpanContext::ImportTypeSpecifier);
        } else {
            self.apply_clause(start, &clause, SpanContext::ImportTypeSpecifier);
        }
        Ok(())
    }

    fn export_declaration(&mut self, start: u32) -> Result<Option<FunctionHead<'a>>, StripError> {
        self.bump(); // `export`
        let token = self.peek();
        let next = self.peek_at(1);
        let same_line = self.next_on_same_line();
        match token.kind {
            TokenKind::Default => {
                self.bump();
                let token = self.peek();
                let next = self.peek_at(1);
                let same_line = self.next_on_same_line();
                if token.kind == TokenKind::Function {
                    return self.function().map(Some);
                }
                if token.is_ident("async") && next.kind == TokenKind::Function && same_line {
                    self.bump();
                    return self.function().map(Some);
                }
                if token.kind == TokenKind::Class {
                    self.class()?;
                } else if token.is_ident("abstract") && next.kind == TokenKind::Class && same_line {
                    self.abstract_class()?;
                } else if token.is_ident("interface") && next.kind == TokenKind::Identifier && same_line {
                    self.interface(start)?;
                } else {
                    self.expression_statement()?;
                }
            }
            TokenKind::LBrace => self.export_list(start, false)?,
            TokenKind::Star => {
                self.bump();
                if self.at_ident("as") {
                    self.bump();
                    self.bump();
                }
                self.module_source()?;
            }
            TokenKind::Eq => return Err(StripError::unexpected(start, "export assignment generates code")),
            TokenKind::Import => return Err(StripError::unexpected(start, "import alias generates code")),
            _ if token.is_ident("as") && next.is_ident("namespace") => {
                return Err(StripError::unexpected(start, "`export as namespace` is not supported"));
            }
            _ if token.is_ident("type") && same_line && next.kind == TokenKind::LBrace => {
                self.bump();
                self.export_list(start, true)?;
            }
            _ if token.is_ident("type") && same_line && next.kind == TokenKind::Star => {
                self.bump();
                self.bump();
                if self.at_ident("as") {
                    self.bump();
                    self.bump();
                }
                self.module_source()?;
                self.push(start, self.prev_end(), SpanContext::ExportTypeSpecifier);
            }
            _ => return self.declaration(start),
        }
        Ok(None)
    }

    fn export_list(&mut self, start: u32, type_only: bool) -> Result<(), StripError> {
        let specifiers = self.specifier_list(type_only)?;
        if self.at_ident("from") {
            self.module_source()?;
        } else {
            self.eat_semicolon();
        }
        if type_only {
            self.push(start, self.prev_end(), SpanContext::ExportTypeSpecifier);
        } else {
            let clause = ImportClause {
                specifiers,
                ..ImportClause::default()
            };
            self.apply_clause(start, &clause, SpanContext::ExportTypeSpecifier);
        }
        Ok(())
    }

    fn apply_clause(&mut self, start: u32, clause: &ImportClause<'a>, context: SpanContext) {
        match clause.elision() {
            ClauseElision::Keep => {}
            ClauseElision::WholeStatement => self.push(start, self.prev_end(), context),
            ClauseElision::Specifiers(spans) => {
                for span in spans {
                    self.push(span.start, span.end, context);
                }
            }
        }
    }

    /// `from 'module'` with optional attributes and `;`.
    fn module_source(&mut self) -> Result<(), StripError> {
        if !self.at_ident("from") {
            let token = self.peek();
            return Err(self.unexpected_token(token, "expected `from`"));
        }
        self.bump();
        if !self.eat(TokenKind::String) {
            let token = self.peek();
            return Err(self.unexpected_token(token, "expected module specifier"));
        }
        self.module_attributes()?;
        self.eat_semicolon();
        Ok(())
    }

    /// `with { type: 'json' }` (or the older `assert { ... }`).
    fn module_attributes(&mut self) -> Result<(), StripError> {
        let token = self.peek();
        if (token.kind == TokenKind::With || token.is_ident("assert"))
            && !token.newline_before
            && self.peek_at(1).kind == TokenKind::LBrace
        {
            self.bump();
            self.pos = match_group_strict(self.tokens, self.pos)?;
        }
        Ok(())
    }

    /// `{ a, type b as c, ... }` in an import or export.
    fn specifier_list(&mut self, type_only_clause: bool) -> Result<Vec<ImportSpecifier<'a>>, StripError> {
        let open = self.bump();
        let mut specifiers = Vec::new();
        loop {
            let token = self.peek();
            if token.kind == TokenKind::Eof || BracketKind::from_close(token.kind).is_some() {
                break;
            }
            let is_type_only = self.at_type_marker()?;
            if is_type_only {
                if type_only_clause {
                    return Err(StripError::InvalidImportTypeMix {
                        offset: token.start(),
                        message: "`type` marker inside a type-only clause".to_string(),
                    });
                }
                self.bump();
            }
            let name = self.peek();
            if !(name.is_word() || name.kind == TokenKind::String) {
                return Err(self.unexpected_token(name, "expected a specifier name"));
            }
            self.bump();
            if self.at_ident("as") {
                self.bump();
                let alias = self.peek();
                if !(alias.is_word() || alias.kind == TokenKind::String) {
                    return Err(self.unexpected_token(alias, "expected a name after `as`"));
                }
                self.bump();
            }
            let span = Span::new(token.start(), self.prev_end());
            let comma = if self.at(TokenKind::Comma) {
                Some(self.bump().span)
            } else {
                None
            };
            let follow = match comma {
                Some(comma) => self.whitespace_end(comma.end),
                None => span.end,
            };
            specifiers.push(ImportSpecifier {
                name: name.text,
                is_type_only,
                span,
                comma,
                follow,
            });
            if comma.is_none() {
                break;
            }
        }
        self.expect_close(open, BracketKind::Curly)?;
        Ok(specifiers)
    }

    /// Whether the current `type` word marks the specifier as type-only
    /// (rather than naming a binding called `type`).
    fn at_type_marker(&self) -> Result<bool, StripError> {
        if !self.at_ident("type") {
            return Ok(false);
        }
        let next = self.peek_at(1);
        match next.kind {
            TokenKind::Comma | TokenKind::RBrace => Ok(false),
            // `type as`, `type as as x` mark a specifier named `as`;
            // `type as x` renames a binding called `type`.
            _ if next.is_ident("as") => {
                let after = self.peek_at(2);
                Ok(matches!(after.kind, TokenKind::Comma | TokenKind::RBrace) || after.is_ident("as"))
            }
            TokenKind::String => Ok(true),
            _ if next.is_word() => Ok(true),
            _ => Err(StripError::InvalidImportTypeMix {
                offset: self.peek().start(),
                message: "`type` marker must be followed by a specifier name".to_string(),
            }),
        }
    }
}
