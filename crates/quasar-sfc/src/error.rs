//! Error types for markup parsing.

use source_map::{LineCol, LineIndex, Span};
use std::fmt;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A structural problem in the markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{message}")]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// Where the problem was detected.
    pub span: Span,
    /// The error code.
    pub code: ErrorCode,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, span: Span, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            span,
            code,
        }
    }

    /// The component has no `<template>` block.
    pub fn template_not_found() -> Self {
        Self::new(
            "Template not found in component source",
            Span::default(),
            ErrorCode::TemplateNotFound,
        )
    }

    /// The template contains no element to use as the root.
    pub fn no_root_element(span: Span) -> Self {
        Self::new(
            "Could not find a valid root element in the template",
            span,
            ErrorCode::NoRootElement,
        )
    }

    /// A tag was opened but never closed.
    pub fn unclosed_tag(tag: &str, span: Span) -> Self {
        Self::new(format!("Unclosed tag: <{}>", tag), span, ErrorCode::UnclosedTag)
    }

    /// A closing tag does not match the open element.
    pub fn mismatched_close(expected: &str, found: &str, span: Span) -> Self {
        Self::new(
            format!("Expected </{}>, found </{}>", expected, found),
            span,
            ErrorCode::MismatchedClosingTag,
        )
    }

    /// A `<` that does not start a tag name.
    pub fn expected_tag_name(span: Span) -> Self {
        Self::new("Expected tag name after '<'", span, ErrorCode::UnexpectedToken)
    }

    /// Elements nested deeper than the parser follows.
    pub fn nesting_too_deep(tag: &str, span: Span) -> Self {
        Self::new(
            format!("<{}> is nested too deeply", tag),
            span,
            ErrorCode::NestingTooDeep,
        )
    }

    /// A second block of a kind that may only appear once.
    pub fn duplicate_block(block: &str, span: Span) -> Self {
        Self::new(
            format!("Duplicate <{}> block, only the first one is used", block),
            span,
            ErrorCode::DuplicateBlock,
        )
    }

    /// Line and column of the error inside `source`.
    pub fn position(&self, source: &str) -> LineCol {
        LineIndex::new(source).locate(self.span)
    }

    /// Shift the span from template-relative into file coordinates.
    pub fn relocated(mut self, offset: u32) -> Self {
        self.span = self.span.shift(offset);
        self
    }
}

/// Error codes for categorizing parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ErrorCode {
    /// No `<template>` block in the component.
    TemplateNotFound,
    /// The template has no element children.
    NoRootElement,
    /// Unexpected token encountered.
    UnexpectedToken,
    /// Unclosed tag.
    UnclosedTag,
    /// Closing tag without a matching opener.
    MismatchedClosingTag,
    /// Duplicate top-level block.
    DuplicateBlock,
    /// Element nesting beyond the parser's depth limit.
    NestingTooDeep,
}

impl ErrorCode {
    /// Get the error code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TemplateNotFound => "template-not-found",
            ErrorCode::NoRootElement => "no-root-element",
            ErrorCode::UnexpectedToken => "unexpected-token",
            ErrorCode::UnclosedTag => "unclosed-tag",
            ErrorCode::MismatchedClosingTag => "mismatched-closing-tag",
            ErrorCode::DuplicateBlock => "duplicate-block",
            ErrorCode::NestingTooDeep => "nesting-too-deep",
        }
    }

    /// Whether the error aborts a conversion.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ErrorCode::DuplicateBlock)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
