use std::path::PathBuf;
use thiserror::Error;

use crate::diagnostic::DiagnosticKind;

/// A fatal error found while stripping one file.
///
/// Every variant carries the byte offset of the violation so it can be
/// turned into a line/column diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StripError {
    /// An open delimiter without a close before end of input, or a close
    /// delimiter without an open one.
    #[error("unterminated bracket `{delimiter}`")]
    UnterminatedBracket { offset: u32, delimiter: char },

    /// `offset` points at the innermost open delimiter, the likely cause.
    #[error("`{open}` closed by mismatched `{close}`")]
    MismatchedBracketKind {
        offset: u32,
        open: char,
        close: char,
        close_offset: u32,
    },

    #[error("unexpected type syntax: {message}")]
    UnexpectedTypeSyntax { offset: u32, message: String },

    #[error("invalid overload group for `{name}`: {message}")]
    InvalidOverloadGroup {
        offset: u32,
        name: String,
        message: String,
    },

    #[error("invalid type-only import: {message}")]
    InvalidImportTypeMix { offset: u32, message: String },

    #[error("invalid token: {message}")]
    InvalidToken { offset: u32, message: String },
}

impl StripError {
    /// Byte offset the diagnostic should point at.
    #[must_use]
    pub fn offset(&self) -> u32 {
        match self {
            Self::UnterminatedBracket { offset, .. }
            | Self::MismatchedBracketKind { offset, .. }
            | Self::UnexpectedTypeSyntax { offset, .. }
            | Self::InvalidOverloadGroup { offset, .. }
            | Self::InvalidImportTypeMix { offset, .. }
            | Self::InvalidToken { offset, .. } => *offset,
        }
    }

    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::UnterminatedBracket { .. } => DiagnosticKind::UnterminatedBracket,
            Self::MismatchedBracketKind { .. } => DiagnosticKind::MismatchedBracketKind,
            Self::UnexpectedTypeSyntax { .. } => DiagnosticKind::UnexpectedTypeSyntax,
            Self::InvalidOverloadGroup { .. } => DiagnosticKind::InvalidOverloadGroup,
            Self::InvalidImportTypeMix { .. } => DiagnosticKind::InvalidImportTypeMix,
            Self::InvalidToken { .. } => DiagnosticKind::InvalidToken,
        }
    }

    pub(crate) fn unexpected(offset: u32, message: impl Into<String>) -> Self {
        Self::UnexpectedTypeSyntax {
            offset,
            message: message.into(),
        }
    }
}

/// Workspace-level error type: I/O, configuration and per-file failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}:{line}:{column}: {source}")]
    Strip {
        path: PathBuf,
        line: u32,
        column: u32,
        #[source]
        source: StripError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_display() {
        let err = StripError::MismatchedBracketKind {
            offset: 17,
            open: '<',
            close: ')',
            close_offset: 19,
        };
        assert_eq!(err.to_string(), "`<` closed by mismatched `)`");
        assert_eq!(err.offset(), 17);
        assert_eq!(err.kind(), DiagnosticKind::MismatchedBracketKind);
    }

    #[test]
    fn test_strip_error_wrapped_with_location() {
        let err = Error::Strip {
            path: PathBuf::from("src/a.ts"),
            line: 3,
            column: 9,
            source: StripError::unexpected(40, "expected `,`"),
        };
        assert_eq!(
            err.to_string(),
            "src/a.ts:3:9: unexpected type syntax: expected `,`"
        );
    }
}
