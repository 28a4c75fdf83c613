//! Token types for type-annotated JavaScript.
//!
//! Only reserved words get their own kind. Contextual words that matter to
//! type stripping (`type`, `interface`, `declare`, `as`, `implements`, the
//! member modifiers, ...) are scanned as `Identifier` and recognized by their
//! text, because every one of them is also a valid binding name in plain
//! JavaScript.

use crate::span::Span;

/// A token with its kind and source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub text: &'a str,
    pub span: Span,
    /// 1-based line of the token start.
    pub line: u32,
    /// 1-based byte column of the token start.
    pub column: u32,
    /// Whether a line terminator appears between the previous token and this one.
    pub newline_before: bool,
}

impl<'a> Token<'a> {
    /// Check for an identifier with the given text (contextual keyword check).
    #[inline]
    #[must_use]
    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == name
    }

    /// Identifiers and reserved words: anything usable as a property or type name.
    #[inline]
    #[must_use]
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Identifier || self.kind.is_keyword()
    }

    /// Byte offset of the token start.
    #[inline]
    #[must_use]
    pub fn start(&self) -> u32 {
        self.span.start
    }

    /// Byte offset just past the token.
    #[inline]
    #[must_use]
    pub fn end(&self) -> u32 {
        self.span.end
    }
}

/// The kind of token.
///
/// `>` is always scanned as a single `Gt`, even when it is part of `>>`,
/// `>=` or `>>>=` in an expression. Nested generic clauses such as
/// `Map<K, Array<V>>` can then be closed one `>` at a time; expression walking
/// never needs the combined operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Literals ===
    /// Identifier or contextual keyword: `foo`, `type`, `as`
    Identifier,
    /// Private class member name: `#field`
    PrivateName,
    /// String literal: `"hello"`, `'world'`
    String,
    /// Number literal: `42`, `3.14`, `0xff`
    Number,
    /// BigInt literal: `42n`
    BigInt,
    /// Regular expression: `/pattern/flags`
    Regex,
    /// Template literal without substitutions
    TemplateNoSub,
    /// Template head: `` `hello ${``
    TemplateHead,
    /// Template middle: `` } middle ${``
    TemplateMiddle,
    /// Template tail: `` } end` ``
    TemplateTail,

    // === Reserved words ===
    // Declarations
    Var,
    Let,
    Const,
    Function,
    Class,
    Enum,

    // Control flow
    If,
    Else,
    Switch,
    Case,
    Default,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,

    // Exception handling
    Try,
    Catch,
    Finally,
    Throw,

    // Operators as keywords
    New,
    Delete,
    Typeof,
    Void,
    In,
    Instanceof,

    // Values
    This,
    Super,
    Null,
    True,
    False,

    // Modules
    Import,
    Export,

    // Other
    Await,
    Yield,
    Extends,
    With,
    Debugger,

    // === Punctuation ===
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]

    Semicolon, // ;
    Comma,     // ,
    Colon,     // :
    Dot,       // .
    Question,  // ?
    At,        // @ (decorators)

    Arrow,       // =>
    Spread,      // ...
    QuestionDot, // ?.

    // === Operators ===
    // Assignment
    Eq,                 // =
    PlusEq,             // +=
    MinusEq,            // -=
    StarEq,             // *=
    SlashEq,            // /=
    PercentEq,          // %=
    StarStarEq,         // **=
    AmpEq,              // &=
    PipeEq,             // |=
    CaretEq,            // ^=
    LtLtEq,             // <<=
    AmpAmpEq,           // &&=
    PipePipeEq,         // ||=
    QuestionQuestionEq, // ??=

    // Comparison
    EqEq,     // ==
    EqEqEq,   // ===
    BangEq,   // !=
    BangEqEq, // !==
    Lt,       // <
    LtEq,     // <=
    Gt,       // > (always a single character, see above)

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    StarStar,   // **
    PlusPlus,   // ++
    MinusMinus, // --

    // Bitwise
    Amp,   // &
    Pipe,  // |
    Caret, // ^
    Tilde, // ~
    LtLt,  // <<

    // Logical
    AmpAmp,           // &&
    PipePipe,         // ||
    Bang,             // !
    QuestionQuestion, // ??

    /// End of file
    Eof,
}

impl TokenKind {
    /// Check if this is a reserved word.
    #[must_use]
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::Enum
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::Switch
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Return
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
                | TokenKind::Throw
                | TokenKind::New
                | TokenKind::Delete
                | TokenKind::Typeof
                | TokenKind::Void
                | TokenKind::In
                | TokenKind::Instanceof
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Import
                | TokenKind::Export
                | TokenKind::Await
                | TokenKind::Yield
                | TokenKind::Extends
                | TokenKind::With
                | TokenKind::Debugger
        )
    }

    /// Check if this token ends an operand, i.e. what follows it is in
    /// operator position (`a /` is a division, `a <` a comparison or a generic
    /// clause, `a!` a non-null assertion).
    #[must_use]
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::PrivateName
                | TokenKind::String
                | TokenKind::Number
                | TokenKind::BigInt
                | TokenKind::Regex
                | TokenKind::TemplateNoSub
                | TokenKind::TemplateTail
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
        )
    }

    /// Check if this is an assignment operator.
    #[must_use]
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::StarStarEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
                | TokenKind::LtLtEq
                | TokenKind::AmpAmpEq
                | TokenKind::PipePipeEq
                | TokenKind::QuestionQuestionEq
        )
    }

    /// Check if this is a binary (or ternary) operator that continues an
    /// expression onto the next line.
    #[must_use]
    pub fn is_binary_operator(&self) -> bool {
        self.is_assignment()
            || matches!(
                self,
                TokenKind::EqEq
                    | TokenKind::EqEqEq
                    | TokenKind::BangEq
                    | TokenKind::BangEqEq
                    | TokenKind::Lt
                    | TokenKind::LtEq
                    | TokenKind::Gt
                    | TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::Star
                    | TokenKind::Slash
                    | TokenKind::Percent
                    | TokenKind::StarStar
                    | TokenKind::Amp
                    | TokenKind::Pipe
                    | TokenKind::Caret
                    | TokenKind::LtLt
                    | TokenKind::AmpAmp
                    | TokenKind::PipePipe
                    | TokenKind::QuestionQuestion
                    | TokenKind::In
                    | TokenKind::Instanceof
                    | TokenKind::Question
                    | TokenKind::Colon
                    | TokenKind::Dot
                    | TokenKind::QuestionDot
                    | TokenKind::Arrow
                    | TokenKind::Comma
            )
    }

    /// Operators that never occur inside a type. Seeing one while
    /// speculatively scanning a `<...>` group means the `<` was a comparison.
    #[must_use]
    pub fn is_expression_only(&self) -> bool {
        matches!(
            self,
            TokenKind::AmpAmp
                | TokenKind::PipePipe
                | TokenKind::QuestionQuestion
                | TokenKind::Plus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::StarStar
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::Bang
                | TokenKind::EqEq
                | TokenKind::EqEqEq
                | TokenKind::BangEq
                | TokenKind::BangEqEq
                | TokenKind::LtEq
                | TokenKind::LtLt
                | TokenKind::Caret
                | TokenKind::Tilde
                | TokenKind::Regex
                | TokenKind::Instanceof
                | TokenKind::Delete
                | TokenKind::Await
                | TokenKind::Yield
        ) || (self.is_assignment() && *self != TokenKind::Eq)
    }
}

/// Look up a reserved word from an identifier string.
#[must_use]
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "var" => Some(TokenKind::Var),
        "let" => Some(TokenKind::Let),
        "const" => Some(TokenKind::Const),
        "function" => Some(TokenKind::Function),
        "class" => Some(TokenKind::Class),
        "enum" => Some(TokenKind::Enum),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "switch" => Some(TokenKind::Switch),
        "case" => Some(TokenKind::Case),
        "default" => Some(TokenKind::Default),
        "for" => Some(TokenKind::For),
        "while" => Some(TokenKind::While),
        "do" => Some(TokenKind::Do),
        "break" => Some(TokenKind::Break),
        "continue" => Some(TokenKind::Continue),
        "return" => Some(TokenKind::Return),
        "try" => Some(TokenKind::Try),
        "catch" => Some(TokenKind::Catch),
        "finally" => Some(TokenKind::Finally),
        "throw" => Some(TokenKind::Throw),
        "new" => Some(TokenKind::New),
        "delete" => Some(TokenKind::Delete),
        "typeof" => Some(TokenKind::Typeof),
        "void" => Some(TokenKind::Void),
        "in" => Some(TokenKind::In),
        "instanceof" => Some(TokenKind::Instanceof),
        "this" => Some(TokenKind::This),
        "super" => Some(TokenKind::Super),
        "null" => Some(TokenKind::Null),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "import" => Some(TokenKind::Import),
        "export" => Some(TokenKind::Export),
        "await" => Some(TokenKind::Await),
        "yield" => Some(TokenKind::Yield),
        "extends" => Some(TokenKind::Extends),
        "with" => Some(TokenKind::With),
        "debugger" => Some(TokenKind::Debugger),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contextual_words_are_identifiers() {
        for word in ["type", "interface", "declare", "as", "implements", "readonly"] {
            assert_eq!(keyword_from_str(word), None, "{word} must stay an identifier");
        }
        assert_eq!(keyword_from_str("class"), Some(TokenKind::Class));
    }

    #[test]
    fn test_expression_only_operators() {
        assert!(TokenKind::AmpAmp.is_expression_only());
        assert!(TokenKind::PlusEq.is_expression_only());
        assert!(!TokenKind::Eq.is_expression_only());
        assert!(!TokenKind::Pipe.is_expression_only());
        assert!(!TokenKind::Arrow.is_expression_only());
    }
}
