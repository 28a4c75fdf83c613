//! Lexer (tokenizer) for type-annotated JavaScript.
//!
//! The lexer converts source text into a stream of position-tagged tokens.
//! Unlike a parser-driven lexer it runs upfront: the classifier needs random
//! access to the token stream so a speculative parse can rewind to a saved
//! index. Regex vs division is decided from the previous token, and template
//! substitutions are tracked with a brace stack so `}` resumes the template.

use crate::error::StripError;
use crate::span::{LineIndex, Span};
use crate::token::{keyword_from_str, Token, TokenKind};

/// The lexer state.
pub struct Lexer<'a> {
    /// Source code.
    source: &'a str,
    /// Source code as bytes (for fast indexing).
    bytes: &'a [u8],
    /// Current byte position.
    pos: usize,
    /// Start position of the current token.
    token_start: usize,
    /// Whether the previous token allows a regex to follow.
    /// This disambiguates `/regex/` vs `a / b`.
    allow_regex: bool,
    /// Whether a line terminator was skipped before the current token.
    newline_before: bool,
    /// Open `{` and `${` nesting; `true` marks a template substitution.
    braces: Vec<bool>,
    /// Open `(` nesting; `true` marks a statement header such as `if (...)`,
    /// after which a new statement (possibly a regex) starts.
    parens: Vec<bool>,
    /// The last two token kinds, most recent first.
    prev: [TokenKind; 2],
    lines: LineIndex,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            token_start: 0,
            allow_regex: true, // At start of file, regex is allowed
            newline_before: false,
            braces: Vec::new(),
            parens: Vec::new(),
            prev: [TokenKind::Eof; 2],
            lines: LineIndex::new(source),
        }
    }

    /// Tokenize the whole source. The returned stream always ends with `Eof`.
    pub fn tokenize(source: &'a str) -> Result<Vec<Token<'a>>, StripError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::with_capacity(source.len() / 4 + 1);
        loop {
            let token = lexer.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>, StripError> {
        self.newline_before = false;
        self.skip_whitespace_and_comments()?;
        self.token_start = self.pos;

        if self.is_eof() {
            return Ok(self.make_token(TokenKind::Eof));
        }

        let ch = self.current();
        let kind = match ch {
            // Identifiers
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' | b'\\' => self.scan_identifier()?,

            // Numbers
            b'0'..=b'9' => self.scan_number(),

            // Strings
            b'"' | b'\'' => self.scan_string(ch)?,

            // Template literals
            b'`' => {
                self.advance();
                self.scan_template_part(TokenKind::TemplateNoSub, TokenKind::TemplateHead)?
            }

            // Punctuation and operators
            b'(' => {
                self.advance();
                let header = self.opens_statement_header();
                self.parens.push(header);
                TokenKind::LParen
            }
            b')' => { self.advance(); TokenKind::RParen }
            b'{' => {
                self.advance();
                self.braces.push(false);
                TokenKind::LBrace
            }
            b'}' => self.scan_right_brace()?,
            b'[' => { self.advance(); TokenKind::LBracket }
            b']' => { self.advance(); TokenKind::RBracket }
            b';' => { self.advance(); TokenKind::Semicolon }
            b',' => { self.advance(); TokenKind::Comma }
            b':' => { self.advance(); TokenKind::Colon }
            b'@' => { self.advance(); TokenKind::At }
            b'~' => { self.advance(); TokenKind::Tilde }
            // A lone `>` even in `>>` and `>=`, see `TokenKind`.
            b'>' => { self.advance(); TokenKind::Gt }

            b'#' => self.scan_private_name()?,
            b'.' => self.scan_dot(),
            b'?' => self.scan_question(),
            b'+' => self.scan_plus(),
            b'-' => self.scan_minus(),
            b'*' => self.scan_star(),
            b'/' => self.scan_slash()?,
            b'%' => self.scan_percent(),
            b'=' => self.scan_equals(),
            b'!' => self.scan_bang(),
            b'<' => self.scan_less_than(),
            b'&' => self.scan_ampersand(),
            b'|' => self.scan_pipe(),
            b'^' => self.scan_caret(),

            _ if ch >= 0x80 => {
                let c = self.current_char();
                if is_id_start(c) {
                    self.scan_identifier()?
                } else {
                    return Err(self.invalid(format!("unexpected character `{c}`")));
                }
            }

            _ => {
                return Err(self.invalid(format!("unexpected character `{}`", ch as char)));
            }
        };

        // Regex may follow anything that does not end an operand. A `}` usually
        // closes a block, after which a new statement may start with a regex.
        self.allow_regex = !kind.ends_operand() || kind == TokenKind::RBrace;
        if kind == TokenKind::RParen && self.parens.pop() == Some(true) {
            self.allow_regex = true;
        }
        self.prev = [kind, self.prev[0]];

        Ok(self.make_token(kind))
    }

    /// Whether a `(` at this point opens an `if`/`while`/`for`/`with` header.
    fn opens_statement_header(&self) -> bool {
        match self.prev {
            [TokenKind::If | TokenKind::While | TokenKind::For | TokenKind::With, _] => true,
            [TokenKind::Await, TokenKind::For] => true,
            _ => false,
        }
    }

    // === Helper methods ===

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn current(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn current_char(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    fn peek_char(&self) -> u8 {
        self.bytes.get(self.pos + 1).copied().unwrap_or(0)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    fn advance_char(&mut self) {
        self.pos += self.current_char().len_utf8().max(1);
    }

    fn make_token(&self, kind: TokenKind) -> Token<'a> {
        let span = Span::new(self.token_start as u32, self.pos as u32);
        let (line, column) = self.lines.location(span.start);
        Token {
            kind,
            text: &self.source[self.token_start..self.pos],
            span,
            line,
            column,
            newline_before: self.newline_before,
        }
    }

    fn invalid(&self, message: impl Into<String>) -> StripError {
        StripError::InvalidToken {
            offset: self.token_start as u32,
            message: message.into(),
        }
    }

    // === Whitespace and comments ===

    fn skip_whitespace_and_comments(&mut self) -> Result<(), StripError> {
        // Hashbang, only at the very start of the file
        if self.pos == 0 && self.current() == b'#' && self.peek_char() == b'!' {
            self.skip_line_comment();
        }
        loop {
            match self.current() {
                b' ' | b'\t' | 0x0b | 0x0c => self.advance(),
                b'\r' | b'\n' => {
                    self.newline_before = true;
                    self.advance();
                }
                b'/' if self.peek_char() == b'/' => self.skip_line_comment(),
                b'/' if self.peek_char() == b'*' => self.skip_block_comment()?,
                ch if ch >= 0x80 => {
                    let c = self.current_char();
                    if c == '\u{2028}' || c == '\u{2029}' {
                        self.newline_before = true;
                    } else if !c.is_whitespace() && c != '\u{feff}' {
                        break;
                    }
                    self.advance_char();
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_line_comment(&mut self) {
        self.advance_n(2); // Skip `//` or `#!`
        while !self.is_eof() && !matches!(self.current(), b'\n' | b'\r') {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), StripError> {
        let start = self.pos;
        self.advance_n(2); // Skip /*
        while !self.is_eof() {
            match self.current() {
                b'*' if self.peek_char() == b'/' => {
                    self.advance_n(2);
                    return Ok(());
                }
                b'\n' | b'\r' => {
                    self.newline_before = true;
                    self.advance();
                }
                _ => self.advance(),
            }
        }
        Err(StripError::InvalidToken {
            offset: start as u32,
            message: "unterminated block comment".to_string(),
        })
    }

    // === Token scanning ===

    fn scan_identifier(&mut self) -> Result<TokenKind, StripError> {
        let mut escaped = false;
        while !self.is_eof() {
            match self.current() {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'$' => self.advance(),
                b'\\' => {
                    self.scan_identifier_escape()?;
                    escaped = true;
                }
                ch if ch >= 0x80 => {
                    let c = self.current_char();
                    if is_id_continue(c) {
                        self.advance_char();
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }

        if escaped {
            // An escaped reserved word is still an identifier reference.
            return Ok(TokenKind::Identifier);
        }
        let ident = &self.source[self.token_start..self.pos];
        Ok(keyword_from_str(ident).unwrap_or(TokenKind::Identifier))
    }

    fn scan_identifier_escape(&mut self) -> Result<(), StripError> {
        self.advance(); // Skip backslash
        if self.current() != b'u' {
            return Err(self.invalid("invalid escape in identifier"));
        }
        self.advance();
        if self.current() == b'{' {
            while !self.is_eof() && self.current() != b'}' {
                self.advance();
            }
            if self.is_eof() {
                return Err(self.invalid("unterminated unicode escape in identifier"));
            }
            self.advance();
        } else {
            for _ in 0..4 {
                if !self.current().is_ascii_hexdigit() {
                    return Err(self.invalid("invalid unicode escape in identifier"));
                }
                self.advance();
            }
        }
        Ok(())
    }

    fn scan_private_name(&mut self) -> Result<TokenKind, StripError> {
        self.advance(); // Skip #
        let c = self.current_char();
        if !(is_id_start(c) || c == '\\') {
            return Err(self.invalid("expected a private name after `#`"));
        }
        self.scan_identifier()?;
        Ok(TokenKind::PrivateName)
    }

    fn scan_number(&mut self) -> TokenKind {
        // Handle different number formats
        if self.current() == b'0' && matches!(self.peek_char(), b'x' | b'X' | b'b' | b'B' | b'o' | b'O') {
            self.advance_n(2);
            while self.current().is_ascii_hexdigit() || self.current() == b'_' {
                self.advance();
            }
            return self.finish_number();
        }

        // Decimal integer part
        self.skip_digits();

        // Decimal part
        if self.current() == b'.' {
            self.advance();
            self.skip_digits();
        }

        // Exponent part
        if matches!(self.current(), b'e' | b'E') {
            self.advance();
            if matches!(self.current(), b'+' | b'-') {
                self.advance();
            }
            self.skip_digits();
        }

        self.finish_number()
    }

    fn skip_digits(&mut self) {
        while self.current().is_ascii_digit() || self.current() == b'_' {
            self.advance();
        }
    }

    fn finish_number(&mut self) -> TokenKind {
        // BigInt suffix
        if self.current() == b'n' {
            self.advance();
            return TokenKind::BigInt;
        }
        TokenKind::Number
    }

    fn scan_string(&mut self, quote: u8) -> Result<TokenKind, StripError> {
        self.advance(); // Skip opening quote
        loop {
            match self.current() {
                _ if self.is_eof() => return Err(self.invalid("unterminated string literal")),
                b'\n' | b'\r' => return Err(self.invalid("unterminated string literal")),
                b'\\' => {
                    self.advance();
                    if self.current() == b'\r' && self.peek_char() == b'\n' {
                        self.advance();
                    }
                    if !self.is_eof() {
                        self.advance_char();
                    }
                }
                ch if ch == quote => {
                    self.advance(); // Skip closing quote
                    return Ok(TokenKind::String);
                }
                _ => self.advance(),
            }
        }
    }

    /// Scan the rest of a template part after its opening `` ` `` or `}`.
    fn scan_template_part(
        &mut self,
        closed: TokenKind,
        open: TokenKind,
    ) -> Result<TokenKind, StripError> {
        while !self.is_eof() {
            match self.current() {
                b'`' => {
                    self.advance();
                    return Ok(closed);
                }
                b'$' if self.peek_char() == b'{' => {
                    self.advance_n(2);
                    self.braces.push(true);
                    return Ok(open);
                }
                b'\\' => {
                    self.advance();
                    if !self.is_eof() {
                        self.advance_char();
                    }
                }
                _ => self.advance(),
            }
        }
        Err(self.invalid("unterminated template literal"))
    }

    fn scan_right_brace(&mut self) -> Result<TokenKind, StripError> {
        self.advance();
        match self.braces.pop() {
            Some(true) => self.scan_template_part(TokenKind::TemplateTail, TokenKind::TemplateMiddle),
            _ => Ok(TokenKind::RBrace),
        }
    }

    fn scan_regex(&mut self) -> Result<TokenKind, StripError> {
        self.advance(); // Skip opening /

        // Scan pattern
        let mut in_class = false;
        loop {
            match self.current() {
                _ if self.is_eof() => return Err(self.invalid("unterminated regular expression")),
                b'\n' | b'\r' => return Err(self.invalid("unterminated regular expression")),
                b'/' if !in_class => break,
                b'[' => {
                    in_class = true;
                    self.advance();
                }
                b']' => {
                    in_class = false;
                    self.advance();
                }
                b'\\' => {
                    self.advance();
                    if !self.is_eof() {
                        self.advance_char();
                    }
                }
                _ => self.advance(),
            }
        }
        self.advance(); // Skip closing /

        // Scan flags
        while self.current().is_ascii_alphabetic() {
            self.advance();
        }

        Ok(TokenKind::Regex)
    }

    // === Multi-character operators ===

    fn scan_dot(&mut self) -> TokenKind {
        if self.peek_char().is_ascii_digit() {
            // Number starting with .
            return self.scan_number();
        }
        self.advance();
        if self.current() == b'.' && self.peek_char() == b'.' {
            self.advance_n(2);
            TokenKind::Spread
        } else {
            TokenKind::Dot
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'?' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::QuestionQuestionEq
                } else {
                    TokenKind::QuestionQuestion
                }
            }
            b'.' if !self.peek_char().is_ascii_digit() => {
                self.advance();
                TokenKind::QuestionDot
            }
            _ => TokenKind::Question,
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'+' => { self.advance(); TokenKind::PlusPlus }
            b'=' => { self.advance(); TokenKind::PlusEq }
            _ => TokenKind::Plus,
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'-' => { self.advance(); TokenKind::MinusMinus }
            b'=' => { self.advance(); TokenKind::MinusEq }
            _ => TokenKind::Minus,
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'*' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::StarStarEq
                } else {
                    TokenKind::StarStar
                }
            }
            b'=' => { self.advance(); TokenKind::StarEq }
            _ => TokenKind::Star,
        }
    }

    fn scan_slash(&mut self) -> Result<TokenKind, StripError> {
        if self.allow_regex {
            return self.scan_regex();
        }
        self.advance();
        Ok(match self.current() {
            b'=' => { self.advance(); TokenKind::SlashEq }
            _ => TokenKind::Slash,
        })
    }

    fn scan_percent(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.advance();
            TokenKind::PercentEq
        } else {
            TokenKind::Percent
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::EqEqEq
                } else {
                    TokenKind::EqEq
                }
            }
            b'>' => { self.advance(); TokenKind::Arrow }
            _ => TokenKind::Eq,
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::BangEqEq
                } else {
                    TokenKind::BangEq
                }
            }
            _ => TokenKind::Bang,
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'<' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::LtLtEq
                } else {
                    TokenKind::LtLt
                }
            }
            b'=' => { self.advance(); TokenKind::LtEq }
            _ => TokenKind::Lt,
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'&' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::AmpAmpEq
                } else {
                    TokenKind::AmpAmp
                }
            }
            b'=' => { self.advance(); TokenKind::AmpEq }
            _ => TokenKind::Amp,
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'|' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::PipePipeEq
                } else {
                    TokenKind::PipePipe
                }
            }
            b'=' => { self.advance(); TokenKind::PipeEq }
            _ => TokenKind::Pipe,
        }
    }

    fn scan_caret(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.advance();
            TokenKind::CaretEq
        } else {
            TokenKind::Caret
        }
    }
}

fn is_id_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_id_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\u{200c}' || c == '\u{200d}'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    #[test]
    fn test_identifiers() {
        let tokens = Lexer::tokenize("foo bar _baz $qux").unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["foo", "bar", "_baz", "$qux", ""]);
        assert!(tokens[..4].iter().all(|t| t.kind == TokenKind::Identifier));
    }

    #[test]
    fn test_keywords_and_contextual_words() {
        assert_eq!(
            tokenize("const let var function type interface"),
            vec![
                TokenKind::Const,
                TokenKind::Let,
                TokenKind::Var,
                TokenKind::Function,
                TokenKind::Identifier,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokenize("42 3.14 0xff 0b101 0o77 1_000 .5 10n 1e-3"),
            vec![
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::BigInt,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            tokenize(r#""hello" 'wo\'rld'"#),
            vec![TokenKind::String, TokenKind::String]
        );
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let err = Lexer::tokenize("let s = 'abc\n';").unwrap_err();
        assert!(matches!(err, StripError::InvalidToken { offset: 8, .. }));
    }

    #[test]
    fn test_greater_than_is_always_single() {
        assert_eq!(
            tokenize("a >>= b >= c"),
            vec![
                TokenKind::Identifier,
                TokenKind::Gt,
                TokenKind::Gt,
                TokenKind::Eq,
                TokenKind::Identifier,
                TokenKind::Gt,
                TokenKind::Eq,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_regex_vs_division() {
        assert_eq!(
            tokenize("a / b; x = /re/g"),
            vec![
                TokenKind::Identifier,
                TokenKind::Slash,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Regex,
            ]
        );
    }

    #[test]
    fn test_template_with_substitutions() {
        assert_eq!(
            tokenize("`a ${ {b: 1}.b } c ${d}`"),
            vec![
                TokenKind::TemplateHead,
                TokenKind::LBrace,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Number,
                TokenKind::RBrace,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::TemplateMiddle,
                TokenKind::Identifier,
                TokenKind::TemplateTail,
            ]
        );
    }

    #[test]
    fn test_comments_set_newline_flag() {
        let tokens = Lexer::tokenize("a // line comment\nb /* block */ c /*\n*/ d").unwrap();
        let flags: Vec<_> = tokens.iter().map(|t| t.newline_before).collect();
        assert_eq!(flags, vec![false, true, false, true, false]);
    }

    #[test]
    fn test_token_positions() {
        let tokens = Lexer::tokenize("let a\n  = 1").unwrap();
        let eq = tokens[2];
        assert_eq!(eq.kind, TokenKind::Eq);
        assert_eq!((eq.line, eq.column), (2, 3));
        assert_eq!(eq.span, Span::new(8, 9));
    }

    #[test]
    fn test_unicode_identifier() {
        let tokens = Lexer::tokenize("const café = 1").unwrap();
        assert_eq!(tokens[1].text, "café");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_private_name_and_hashbang() {
        assert_eq!(
            tokenize("#!/usr/bin/env node\nthis.#x"),
            vec![TokenKind::This, TokenKind::Dot, TokenKind::PrivateName]
        );
    }
}
