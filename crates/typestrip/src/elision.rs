//! Elided span records.

use serde::Serialize;

use crate::span::Span;

/// Why a span was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpanContext {
    ParamType,
    ReturnType,
    VarType,
    FieldType,
    TypeAliasBody,
    InterfaceBody,
    GenericClause,
    AsExpressionType,
    ImplementsClause,
    AmbientDeclaration,
    OverloadSignature,
    ImportTypeSpecifier,
    ExportTypeSpecifier,
    ModifierKeyword,
    OptionalMarker,
    NonNullAssertion,
    ThisParameter,
}

impl SpanContext {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParamType => "ParamType",
            Self::ReturnType => "ReturnType",
            Self::VarType => "VarType",
            Self::FieldType => "FieldType",
            Self::TypeAliasBody => "TypeAliasBody",
            Self::InterfaceBody => "InterfaceBody",
            Self::GenericClause => "GenericClause",
            Self::AsExpressionType => "AsExpressionType",
            Self::ImplementsClause => "ImplementsClause",
            Self::AmbientDeclaration => "AmbientDeclaration",
            Self::OverloadSignature => "OverloadSignature",
            Self::ImportTypeSpecifier => "ImportTypeSpecifier",
            Self::ExportTypeSpecifier => "ExportTypeSpecifier",
            Self::ModifierKeyword => "ModifierKeyword",
            Self::OptionalMarker => "OptionalMarker",
            Self::NonNullAssertion => "NonNullAssertion",
            Self::ThisParameter => "ThisParameter",
        }
    }
}

impl std::fmt::Display for SpanContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A removed byte range and the site it was removed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ElidedSpan {
    pub start: u32,
    pub end: u32,
    pub context: SpanContext,
}

impl ElidedSpan {
    #[must_use]
    pub const fn new(span: Span, context: SpanContext) -> Self {
        Self {
            start: span.start,
            end: span.end,
            context,
        }
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// The original text of the removed range, e.g. to display a type string.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        self.span().text(source)
    }
}
