//! Errors raised while evaluating template directives.
//!
//! None of these abort a conversion. The evaluator logs them and falls back
//! to the literal expression text (or `false` for conditions).

use std::fmt;

/// Result type for directive evaluation.
pub type DirectiveResult<T> = Result<T, DirectiveError>;

/// A directive expression that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} in `{expression}`")]
pub struct DirectiveError {
    /// The error message.
    pub message: String,
    /// The expression as written in the template.
    pub expression: String,
    /// The error code.
    pub code: DirectiveErrorCode,
}

impl DirectiveError {
    /// Create a new directive error.
    pub fn new(
        message: impl Into<String>,
        expression: impl Into<String>,
        code: DirectiveErrorCode,
    ) -> Self {
        Self {
            message: message.into(),
            expression: expression.into(),
            code,
        }
    }

    /// Syntax outside the supported expression subset.
    pub fn unsupported(message: impl Into<String>, expression: &str) -> Self {
        Self::new(message, expression, DirectiveErrorCode::UnsupportedSyntax)
    }

    /// An expression nested deeper than the evaluator follows.
    pub fn too_deep(expression: &str) -> Self {
        Self::new(
            "Expression is nested too deeply",
            expression,
            DirectiveErrorCode::NestingTooDeep,
        )
    }

    /// A `v-for` that does not follow `item [, index] in source`.
    pub fn invalid_v_for(expression: &str) -> Self {
        Self::new(
            "Expected `item in source` or `(item, index) in source`",
            expression,
            DirectiveErrorCode::InvalidVFor,
        )
    }
}

/// Error codes for directive evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveErrorCode {
    /// Tokens the evaluator does not understand.
    UnsupportedSyntax,
    /// Invalid v-for syntax.
    InvalidVFor,
    /// Nesting beyond the evaluator's depth limit.
    NestingTooDeep,
}

impl DirectiveErrorCode {
    /// Get the error code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedSyntax => "unsupported-syntax",
            Self::InvalidVFor => "invalid-v-for",
            Self::NestingTooDeep => "nesting-too-deep",
        }
    }
}

impl fmt::Display for DirectiveErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
