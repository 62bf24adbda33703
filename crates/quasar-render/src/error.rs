//! Error types for rendering.
//!
//! Only [`ConvertError`] aborts a conversion. The others are recovered where
//! they happen and logged.

use crate::target::{NodeId, NodeKind};
use quasar_sfc::{ErrorCode, ParseError};
use smol_str::SmolStr;

/// Fatal conversion failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    #[error("template not found in component source")]
    TemplateNotFound,
    #[error("parse error: {0}")]
    Parse(ParseError),
    #[error("render failed: {0}")]
    Render(String),
}

impl From<ParseError> for ConvertError {
    fn from(err: ParseError) -> Self {
        match err.code {
            ErrorCode::TemplateNotFound => ConvertError::TemplateNotFound,
            _ => ConvertError::Parse(err),
        }
    }
}

impl From<TargetError> for ConvertError {
    fn from(err: TargetError) -> Self {
        ConvertError::Render(err.to_string())
    }
}

/// A property that does not apply to the node it was set on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply `{property}` to {kind:?} node {node}")]
pub struct StyleApplicationError {
    pub property: &'static str,
    pub node: NodeId,
    pub kind: NodeKind,
}

/// Structural misuse of a render target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("unknown render node {0}")]
    UnknownNode(NodeId),
    #[error("render node {0} cannot hold children")]
    NotAContainer(NodeId),
    #[error(transparent)]
    Style(#[from] StyleApplicationError),
}

/// Every entry of a resource chain failed to load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no {resource} could be loaded (tried {tried})")]
pub struct ResourceUnavailableError {
    pub resource: &'static str,
    pub tried: String,
}

/// A component processor gave up on a node.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("processor for <{tag}> failed: {message}")]
pub struct ProcessorError {
    pub tag: SmolStr,
    pub message: String,
}

impl ProcessorError {
    pub fn new(tag: impl Into<SmolStr>, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            message: message.into(),
        }
    }

    /// Attach a tag to a lower-level failure.
    pub fn wrap(tag: &str, err: impl std::fmt::Display) -> Self {
        Self::new(tag, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use source_map::Span;

    #[test]
    fn test_template_not_found_is_its_own_variant() {
        assert_eq!(
            ConvertError::from(ParseError::template_not_found()),
            ConvertError::TemplateNotFound
        );
        let unclosed = ParseError::unclosed_tag("div", Span::between(0, 4));
        assert!(matches!(ConvertError::from(unclosed), ConvertError::Parse(_)));
    }

    #[test]
    fn test_messages() {
        let err = StyleApplicationError {
            property: "padding",
            node: NodeId::new(3),
            kind: NodeKind::Text,
        };
        assert_eq!(err.to_string(), "cannot apply `padding` to Text node #3");
        assert_eq!(
            ProcessorError::new("q-btn", "boom").to_string(),
            "processor for <q-btn> failed: boom"
        );
    }
}
