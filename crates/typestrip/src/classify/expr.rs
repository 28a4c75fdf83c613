//! Expressions, parameter lists and binding patterns.

use super::{Classifier, TypeSite};
use crate::bracket::{match_group_speculative, BracketKind};
use crate::elision::SpanContext;
use crate::error::StripError;
use crate::grouper::FunctionHead;
use crate::token::{Token, TokenKind};

/// Where an expression ends, besides the closing brackets, `;`, template
/// continuations and end of input, which always end it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExprEnd {
    /// A top-level `,` ends the expression.
    pub comma: bool,
    /// A line break after a complete operand ends the expression.
    pub asi: bool,
}

impl ExprEnd {
    /// Expression statements, `return` and `throw` arguments, field initializers.
    pub(crate) const STATEMENT: Self = Self { comma: false, asi: true };
    /// Variable initializers.
    pub(crate) const INITIALIZER: Self = Self { comma: true, asi: true };
    /// Arguments, defaults and property values.
    pub(crate) const LIST_ITEM: Self = Self { comma: true, asi: false };
    /// Everything inside `( )`, `[ ]` and template substitutions.
    pub(crate) const GROUP: Self = Self { comma: false, asi: false };
}

/// What a single step of the expression walk did.
enum Step {
    /// Consumed a complete operand; an operator is expected next.
    Operand,
    /// Consumed a prefix; an operand is still expected.
    Prefix,
    Stop,
}

fn always_ends_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::Semicolon
            | TokenKind::Eof
            | TokenKind::TemplateMiddle
            | TokenKind::TemplateTail
    )
}

/// Tokens that continue an expression from the previous line.
fn continues_expression(token: &Token<'_>) -> bool {
    token.kind.is_binary_operator()
        || matches!(
            token.kind,
            TokenKind::LParen | TokenKind::LBracket | TokenKind::TemplateNoSub | TokenKind::TemplateHead
        )
}

/// Tokens that can name a property or start a computed key.
pub(crate) fn is_property_key(token: &Token<'_>) -> bool {
    token.is_word()
        || matches!(
            token.kind,
            TokenKind::String | TokenKind::Number | TokenKind::BigInt | TokenKind::PrivateName | TokenKind::LBracket
        )
}

impl<'a> Classifier<'a> {
    /// Walk one expression.
    pub(crate) fn expression(&mut self, end: ExprEnd) -> Result<(), StripError> {
        let mut operand = true;
        let mut ternaries = 0usize;
        loop {
            let token = self.peek();
            if always_ends_expression(token.kind) {
                return Ok(());
            }
            if operand {
                if token.kind == TokenKind::Comma && !end.comma {
                    // Array hole or sequence after a trailing comma.
                    self.bump();
                    continue;
                }
                match self.operand(ternaries)? {
                    Step::Operand => operand = false,
                    Step::Prefix => {}
                    Step::Stop => return Ok(()),
                }
                continue;
            }

            if token.newline_before && end.asi && !continues_expression(&token) {
                return Ok(());
            }
            match token.kind {
                TokenKind::Dot | TokenKind::QuestionDot => {
                    self.bump();
                    let name = self.peek();
                    if name.is_word() || name.kind == TokenKind::PrivateName {
                        self.bump();
                    }
                }
                TokenKind::LParen => {
                    let open = self.bump();
                    self.expression(ExprEnd::GROUP)?;
                    self.expect_close(open, BracketKind::Paren)?;
                }
                TokenKind::LBracket => {
                    let open = self.bump();
                    self.expression(ExprEnd::GROUP)?;
                    self.expect_close(open, BracketKind::Square)?;
                }
                TokenKind::TemplateNoSub => {
                    self.bump();
                }
                TokenKind::TemplateHead => self.template()?,
                TokenKind::Lt => {
                    if !self.call_type_arguments() {
                        self.bump();
                        operand = true;
                    }
                }
                TokenKind::Bang => {
                    let adjacent = token.start() == self.prev_end();
                    self.bump();
                    if adjacent && self.options.non_null_enabled() {
                        self.push(token.start(), token.end(), SpanContext::NonNullAssertion);
                    }
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    self.bump();
                }
                TokenKind::Identifier if (token.text == "as" || token.text == "satisfies") && !token.newline_before => {
                    self.as_expression()?;
                }
                TokenKind::Identifier if token.text == "of" => {
                    self.bump();
                    operand = true;
                }
                TokenKind::Question => {
                    self.bump();
                    ternaries += 1;
                    operand = true;
                }
                TokenKind::Colon => {
                    if ternaries == 0 {
                        return Ok(());
                    }
                    self.bump();
                    ternaries -= 1;
                    operand = true;
                }
                TokenKind::Arrow => {
                    self.bump();
                    if self.at(TokenKind::LBrace) {
                        self.block()?;
                    } else {
                        operand = true;
                    }
                }
                TokenKind::Comma if end.comma => return Ok(()),
                TokenKind::Gt => {
                    // `>>`, `>=`, `>>>=` arrive as adjacent single-character tokens.
                    self.bump();
                    while matches!(self.peek().kind, TokenKind::Gt | TokenKind::Eq)
                        && self.peek().start() == self.prev_end()
                    {
                        if self.bump().kind == TokenKind::Eq {
                            break;
                        }
                    }
                    operand = true;
                }
                kind if kind.is_binary_operator() => {
                    self.bump();
                    operand = true;
                }
                _ => return Ok(()),
            }
        }
    }

    fn operand(&mut self, ternaries: usize) -> Result<Step, StripError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier => {
                if token.text == "async" && self.next_on_same_line() {
                    let next = self.peek_at(1);
                    match next.kind {
                        TokenKind::Function => {
                            self.bump();
                            self.function_expression()?;
                            return Ok(Step::Operand);
                        }
                        TokenKind::LParen => {
                            self.bump();
                            self.paren_or_arrow(ternaries)?;
                            return Ok(Step::Operand);
                        }
                        TokenKind::Lt => {
                            self.bump();
                            self.generic_arrow()?;
                            return Ok(Step::Operand);
                        }
                        // `async x => ...`; the arrow itself is an operator.
                        TokenKind::Identifier if self.peek_at(2).kind == TokenKind::Arrow => {
                            self.bump();
                        }
                        _ => {}
                    }
                }
                self.bump();
                Ok(Step::Operand)
            }
            TokenKind::PrivateName
            | TokenKind::String
            | TokenKind::Number
            | TokenKind::BigInt
            | TokenKind::Regex
            | TokenKind::TemplateNoSub
            | TokenKind::This
            | TokenKind::Super
            | TokenKind::Null
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Import => {
                self.bump();
                Ok(Step::Operand)
            }
            TokenKind::TemplateHead => {
                self.template()?;
                Ok(Step::Operand)
            }
            TokenKind::LParen => {
                self.paren_or_arrow(ternaries)?;
                Ok(Step::Operand)
            }
            TokenKind::LBracket => {
                let open = self.bump();
                self.expression(ExprEnd::GROUP)?;
                self.expect_close(open, BracketKind::Square)?;
                Ok(Step::Operand)
            }
            TokenKind::LBrace => {
                self.object_literal()?;
                Ok(Step::Operand)
            }
            TokenKind::Function => {
                self.function_expression()?;
                Ok(Step::Operand)
            }
            TokenKind::Class => {
                self.class()?;
                Ok(Step::Operand)
            }
            TokenKind::Lt => {
                self.generic_arrow()?;
                Ok(Step::Operand)
            }
            TokenKind::New => {
                self.bump();
                // `new.target`
                if self.at(TokenKind::Dot) {
                    Ok(Step::Operand)
                } else {
                    Ok(Step::Prefix)
                }
            }
            TokenKind::At => {
                self.decorator()?;
                Ok(Step::Prefix)
            }
            TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::Typeof
            | TokenKind::Void
            | TokenKind::Delete
            | TokenKind::Await
            | TokenKind::Yield
            | TokenKind::Spread => {
                self.bump();
                Ok(Step::Prefix)
            }
            _ => Ok(Step::Stop),
        }
    }

    /// `<...>` after a callee, when `(` or a template follows the close.
    /// After `new` the argument list is optional, so the end of the
    /// expression also qualifies.
    fn call_type_arguments(&mut self) -> bool {
        let Some(end) = match_group_speculative(self.tokens, self.pos) else {
            return false;
        };
        let next = self.tokens[end];
        let continues = matches!(
            next.kind,
            TokenKind::LParen | TokenKind::TemplateNoSub | TokenKind::TemplateHead
        );
        let ends = next.newline_before
            || matches!(next.kind, TokenKind::Semicolon | TokenKind::Comma)
            || always_ends_expression(next.kind);
        if !(continues || (ends && self.callee_follows_new())) {
            return false;
        }
        let open = self.peek();
        self.push(open.start(), self.tokens[end - 1].end(), SpanContext::GenericClause);
        self.pos = end;
        true
    }

    /// Whether the dotted name just before the cursor is the target of `new`.
    fn callee_follows_new(&self) -> bool {
        let mut i = self.pos;
        loop {
            let Some(name) = i.checked_sub(1).map(|j| self.tokens[j]) else {
                return false;
            };
            if !name.is_word() {
                return false;
            }
            match i.checked_sub(2).map(|j| self.tokens[j].kind) {
                Some(TokenKind::Dot) => i -= 2,
                Some(TokenKind::New) => return true,
                _ => return false,
            }
        }
    }

    /// `as Type`, `as const` or `satisfies Type`, elided from the end of the
    /// operand so that `x as T;` becomes `x;`.
    fn as_expression(&mut self) -> Result<(), StripError> {
        let start = self.prev_end();
        self.bump();
        let end = if self.at(TokenKind::Const) {
            self.bump().end()
        } else {
            self.type_shape(TypeSite::As)?
        };
        self.push(start, end, SpanContext::AsExpressionType);
        Ok(())
    }

    fn template(&mut self) -> Result<(), StripError> {
        self.bump(); // head
        loop {
            self.expression(ExprEnd::GROUP)?;
            let token = self.peek();
            match token.kind {
                TokenKind::TemplateMiddle => {
                    self.bump();
                }
                TokenKind::TemplateTail => {
                    self.bump();
                    return Ok(());
                }
                _ => return Err(self.unexpected_token(token, "expected `}` closing template substitution")),
            }
        }
    }

    /// Index just past the parenthesized group at `start`, ignoring `<`/`>`.
    fn skip_parens(&self, start: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(start) {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
        }
        None
    }

    /// `(` in operand position: an arrow parameter list when `=>` (or a
    /// return type and `=>`) follows the close, otherwise a parenthesized
    /// expression.
    fn paren_or_arrow(&mut self, ternaries: usize) -> Result<(), StripError> {
        let after = self.skip_parens(self.pos).map(|i| self.tokens[i]);
        match after {
            Some(next) if next.kind == TokenKind::Arrow && !next.newline_before => self.params(),
            Some(next) if next.kind == TokenKind::Colon && ternaries == 0 => {
                let checkpoint = self.checkpoint();
                if self.arrow_head_with_return().is_err() {
                    self.rollback(checkpoint);
                    self.paren_group()?;
                }
                Ok(())
            }
            _ => self.paren_group(),
        }
    }

    fn arrow_head_with_return(&mut self) -> Result<(), StripError> {
        self.params()?;
        self.annotation(TypeSite::ArrowReturn, SpanContext::ReturnType)
    }

    fn paren_group(&mut self) -> Result<(), StripError> {
        let open = self.bump();
        self.expression(ExprEnd::GROUP)?;
        self.expect_close(open, BracketKind::Paren)?;
        Ok(())
    }

    /// `<T>(x: T) => x`. A `<` in operand position that does not start an
    /// arrow function is an angle-bracket type assertion, which is rejected.
    fn generic_arrow(&mut self) -> Result<(), StripError> {
        let open = self.peek();
        let assertion =
            || StripError::unexpected(open.start(), "angle-bracket type assertions are not supported");
        let Some(end) = match_group_speculative(self.tokens, self.pos) else {
            return Err(assertion());
        };
        if self.tokens[end].kind != TokenKind::LParen {
            return Err(assertion());
        }
        self.push(open.start(), self.tokens[end - 1].end(), SpanContext::GenericClause);
        self.pos = end;
        match self.skip_parens(self.pos).map(|i| self.tokens[i].kind) {
            Some(TokenKind::Arrow) => self.params(),
            Some(TokenKind::Colon) => self.arrow_head_with_return(),
            _ => Err(assertion()),
        }
    }

    fn function_expression(&mut self) -> Result<(), StripError> {
        let head = self.function()?;
        if head.bodied {
            Ok(())
        } else {
            let token = self.peek();
            Err(self.unexpected_token(token, "expected function body"))
        }
    }

    /// `function name<...>(...): R { ... }` from the `function` keyword.
    /// A missing body is reported through the head, not as an error.
    pub(crate) fn function(&mut self) -> Result<FunctionHead<'a>, StripError> {
        self.bump(); // `function`
        self.eat(TokenKind::Star);
        let name = if self.peek().is_word() {
            Some(self.bump().text)
        } else {
            None
        };
        let bodied = self.method_tail()?;
        Ok(FunctionHead { name, bodied })
    }

    /// Generic clause, parameters, return type and body of a function or
    /// method. Returns whether a body was present.
    pub(crate) fn method_tail(&mut self) -> Result<bool, StripError> {
        if self.at(TokenKind::Lt) {
            self.generic_clause()?;
        }
        if !self.at(TokenKind::LParen) {
            let token = self.peek();
            return Err(self.unexpected_token(token, "expected `(`"));
        }
        self.params()?;
        if self.at(TokenKind::Colon) {
            self.annotation(TypeSite::Return, SpanContext::ReturnType)?;
        }
        let next = self.peek();
        match next.kind {
            TokenKind::LBrace => {
                self.block()?;
                Ok(true)
            }
            TokenKind::Semicolon => {
                self.bump();
                Ok(false)
            }
            TokenKind::RBrace | TokenKind::Eof => Ok(false),
            _ if next.newline_before => Ok(false),
            _ => Err(self.unexpected_token(next, "expected function body")),
        }
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// `( ... )` parameter list.
    pub(crate) fn params(&mut self) -> Result<(), StripError> {
        let open = self.bump();
        let mut first = true;
        loop {
            let token = self.peek();
            if token.kind == TokenKind::Eof || BracketKind::from_close(token.kind).is_some() {
                break;
            }
            if first && token.kind == TokenKind::This && self.peek_at(1).kind == TokenKind::Colon {
                first = false;
                self.this_param()?;
                continue;
            }
            first = false;
            self.param()?;
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect_close(open, BracketKind::Paren)?;
        Ok(())
    }

    /// `this: T` with its trailing comma.
    fn this_param(&mut self) -> Result<(), StripError> {
        let this = self.bump();
        self.bump(); // `:`
        let mut end = self.type_shape(TypeSite::Param)?;
        if self.at(TokenKind::Comma) {
            let comma = self.bump();
            end = self.whitespace_end(comma.end());
        }
        self.push(this.start(), end, SpanContext::ThisParameter);
        Ok(())
    }

    fn param(&mut self) -> Result<(), StripError> {
        while self.at(TokenKind::At) {
            self.decorator()?;
        }
        let token = self.peek();
        if super::class::is_modifier(&token) && self.next_on_same_line() && starts_binding(&self.peek_at(1)) {
            return Err(StripError::unexpected(
                token.start(),
                format!("parameter property `{}` generates code", token.text),
            ));
        }
        self.eat(TokenKind::Spread);
        self.binding()?;
        if self.at(TokenKind::Question) {
            let marker = self.bump();
            self.push(marker.start(), marker.end(), SpanContext::OptionalMarker);
        }
        if self.at(TokenKind::Colon) {
            self.annotation(TypeSite::Param, SpanContext::ParamType)?;
        }
        if self.eat(TokenKind::Eq) {
            self.expression(ExprEnd::LIST_ITEM)?;
        }
        let next = self.peek();
        if next.kind == TokenKind::Comma || next.kind == TokenKind::Eof || BracketKind::from_close(next.kind).is_some() {
            Ok(())
        } else {
            Err(self.unexpected_token(next, "expected `,` or `)`"))
        }
    }

    /// `@name.path(args)` or `@(expr)`.
    pub(crate) fn decorator(&mut self) -> Result<(), StripError> {
        self.bump(); // `@`
        if self.at(TokenKind::LParen) {
            return self.paren_group();
        }
        let name = self.peek();
        if !name.is_word() {
            return Err(self.unexpected_token(name, "expected decorator name"));
        }
        self.bump();
        while self.at(TokenKind::Dot) && self.peek_at(1).is_word() {
            self.bump();
            self.bump();
        }
        if self.at(TokenKind::LParen) {
            self.paren_group()?;
        }
        Ok(())
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    /// A binding name or destructuring pattern.
    pub(crate) fn binding(&mut self) -> Result<(), StripError> {
        let token = self.peek();
        match token.kind {
            TokenKind::LBrace => self.object_pattern(),
            TokenKind::LBracket => self.array_pattern(),
            _ if token.is_word() => {
                self.bump();
                Ok(())
            }
            _ => Err(self.unexpected_token(token, "expected a binding name")),
        }
    }

    fn object_pattern(&mut self) -> Result<(), StripError> {
        let open = self.bump();
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::Spread => {
                    self.bump();
                    self.binding()?;
                }
                _ => {
                    self.property_key()?;
                    if self.eat(TokenKind::Colon) {
                        self.binding()?;
                    }
                }
            }
            if self.eat(TokenKind::Eq) {
                self.expression(ExprEnd::LIST_ITEM)?;
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect_close(open, BracketKind::Curly)?;
        Ok(())
    }

    fn array_pattern(&mut self) -> Result<(), StripError> {
        let open = self.bump();
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::RBracket | TokenKind::Eof => break,
                TokenKind::Comma => {
                    self.bump();
                    continue;
                }
                TokenKind::Spread => {
                    self.bump();
                    self.binding()?;
                }
                _ => self.binding()?,
            }
            if self.eat(TokenKind::Eq) {
                self.expression(ExprEnd::LIST_ITEM)?;
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect_close(open, BracketKind::Square)?;
        Ok(())
    }

    // =========================================================================
    // Object Literals
    // =========================================================================

    /// A property name: word, string, number or `[computed]`. Returns the
    /// source text of the key.
    pub(crate) fn property_key(&mut self) -> Result<&'a str, StripError> {
        let token = self.peek();
        if token.kind == TokenKind::LBracket {
            let open = self.bump();
            self.expression(ExprEnd::GROUP)?;
            let close = self.expect_close(open, BracketKind::Square)?;
            return Ok(&self.source[open.start() as usize..close.end() as usize]);
        }
        if is_property_key(&token) {
            self.bump();
            return Ok(token.text);
        }
        Err(self.unexpected_token(token, "expected a property name"))
    }

    /// `get`, `set`, `async` or `*` before an object or class member key.
    pub(crate) fn at_accessor_prefix(&self) -> bool {
        let token = self.peek();
        if token.kind == TokenKind::Star {
            return true;
        }
        let is_prefix = token.is_ident("get") || token.is_ident("set") || token.is_ident("async");
        let next = self.peek_at(1);
        is_prefix && self.next_on_same_line() && (is_property_key(&next) || next.kind == TokenKind::Star)
    }

    fn object_literal(&mut self) -> Result<(), StripError> {
        let open = self.bump();
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::Comma => {
                    self.bump();
                    continue;
                }
                TokenKind::Spread => {
                    self.bump();
                    self.expression(ExprEnd::LIST_ITEM)?;
                    continue;
                }
                _ => {}
            }
            while self.at_accessor_prefix() {
                self.bump();
            }
            self.property_key()?;
            match self.peek().kind {
                TokenKind::Lt | TokenKind::LParen => {
                    if !self.method_tail()? {
                        let token = self.peek();
                        return Err(self.unexpected_token(token, "expected method body"));
                    }
                }
                TokenKind::Colon | TokenKind::Eq => {
                    self.bump();
                    self.expression(ExprEnd::LIST_ITEM)?;
                }
                _ => {}
            }
        }
        self.expect_close(open, BracketKind::Curly)?;
        Ok(())
    }
}

fn starts_binding(token: &Token<'_>) -> bool {
    token.is_word() || matches!(token.kind, TokenKind::LBrace | TokenKind::LBracket | TokenKind::Spread)
}
