//! Diagnostic records reported alongside stripped output.

use serde::{Deserialize, Serialize};

use crate::error::StripError;
use crate::span::LineIndex;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Error message. Output code is unusable.
    Error,
}

impl DiagnosticSeverity {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    UnterminatedBracket,
    MismatchedBracketKind,
    UnexpectedTypeSyntax,
    InvalidOverloadGroup,
    InvalidImportTypeMix,
    InvalidToken,
}

impl DiagnosticKind {
    /// Stable SCREAMING_SNAKE_CASE code for machine-readable output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnterminatedBracket => "STRIP_UNTERMINATED_BRACKET",
            Self::MismatchedBracketKind => "STRIP_MISMATCHED_BRACKET_KIND",
            Self::UnexpectedTypeSyntax => "STRIP_UNEXPECTED_TYPE_SYNTAX",
            Self::InvalidOverloadGroup => "STRIP_INVALID_OVERLOAD_GROUP",
            Self::InvalidImportTypeMix => "STRIP_INVALID_IMPORT_TYPE_MIX",
            Self::InvalidToken => "STRIP_INVALID_TOKEN",
        }
    }
}

/// A diagnostic message with a 1-based source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    /// Human-readable message.
    pub message: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based byte column.
    pub column: u32,
}

impl Diagnostic {
    /// Create an error diagnostic at the given location.
    #[must_use]
    pub fn error(kind: DiagnosticKind, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            line,
            column,
        }
    }

    /// Build the error diagnostic for a fatal strip error.
    #[must_use]
    pub fn from_strip_error(err: &StripError, lines: &LineIndex) -> Self {
        let (line, column) = lines.location(err.offset());
        Self::error(err.kind(), err.to_string(), line, column)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}]: {}",
            self.line,
            self.column,
            self.severity,
            self.kind.code(),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_strip_error_resolves_location() {
        let lines = LineIndex::new("let a\nlet b: (x");
        let err = StripError::UnterminatedBracket { offset: 13, delimiter: '(' };
        let diag = Diagnostic::from_strip_error(&err, &lines);
        assert_eq!((diag.line, diag.column), (2, 8));
        assert!(diag.is_error());
        assert_eq!(diag.kind, DiagnosticKind::UnterminatedBracket);
    }

    #[test]
    fn test_serialized_shape() {
        let diag = Diagnostic::error(DiagnosticKind::InvalidToken, "bad", 1, 2);
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "InvalidToken");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["line"], 1);
    }
}
