//! Top-level blocks of a single-file component.

use smol_str::SmolStr;
use source_map::Span;

use crate::error::{ParseError, ParseResult};

/// The blocks found in a component file.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SfcBlocks {
    /// The first `<template>` block.
    pub template: Option<SfcBlock>,
    /// The options-API `<script>` block, or `<script setup>` when that is
    /// the only script.
    pub script: Option<SfcBlock>,
    /// `<style>` blocks in source order.
    pub styles: Vec<SfcBlock>,
    /// Problems that did not stop extraction (duplicate blocks).
    pub warnings: Vec<ParseError>,
}

impl SfcBlocks {
    /// The template block, or a `template-not-found` error.
    pub fn require_template(&self) -> ParseResult<&SfcBlock> {
        self.template.as_ref().ok_or_else(ParseError::template_not_found)
    }

    /// Script source, empty when the component has no script.
    pub fn script_source(&self) -> &str {
        self.script.as_ref().map_or("", |s| s.content.as_str())
    }
}

/// One top-level block.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SfcBlock {
    /// Lowercased tag name (`template`, `script`, `style`, ...).
    pub tag: SmolStr,
    /// Attributes on the opening tag.
    pub attrs: Vec<BlockAttr>,
    /// Raw text between the opening and closing tags.
    pub content: String,
    /// Where `content` sits in the file.
    pub content_span: Span,
    /// The whole block, tags included.
    pub span: Span,
}

impl SfcBlock {
    /// Get an attribute value by name.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .and_then(|a| a.value.as_deref())
    }

    /// Check if an attribute exists (for boolean attributes).
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// An attribute on a block tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockAttr {
    pub name: SmolStr,
    /// `None` for boolean attributes such as `setup` or `scoped`.
    pub value: Option<String>,
    pub span: Span,
}
