//! Tree types for parsed and normalized templates.

use indexmap::IndexMap;
use smol_str::SmolStr;
use source_map::Span;

/// Attribute map that keeps declaration order.
pub type Attributes = IndexMap<String, String>;

/// Tag reserved for text leaves.
pub const TEXT_TAG: &str = "#text";

/// Tag of a node removed by a falsy `v-if` or an empty `v-for`.
pub const SUPPRESSED_TAG: &str = "";

/// A node produced by the markup parser.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GenericNode {
    Element(GenericElement),
    Text(TextNode),
}

impl GenericNode {
    /// Get the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Self::Element(el) => el.span,
            Self::Text(text) => text.span,
        }
    }

    pub fn as_element(&self) -> Option<&GenericElement> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }
}

/// An element with raw, unevaluated attributes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenericElement {
    /// Lowercased tag name.
    pub tag: SmolStr,
    /// Attributes in source order. Boolean attributes map to `""`.
    pub attrs: Attributes,
    pub children: Vec<GenericNode>,
    pub self_closing: bool,
    pub span: Span,
}

impl GenericElement {
    /// Create an element with no attributes or children.
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: GenericNode) -> Self {
        self.children.push(child);
        self
    }

    /// Element children only.
    pub fn child_elements(&self) -> impl Iterator<Item = &GenericElement> {
        self.children.iter().filter_map(GenericNode::as_element)
    }
}

/// Raw text between tags. Interpolations are kept verbatim.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextNode {
    pub content: String,
    pub span: Span,
}

impl TextNode {
    pub fn new(content: impl Into<String>, span: Span) -> Self {
        Self {
            content: content.into(),
            span,
        }
    }
}

/// Scalar description of an ancestor, pushed down for layout decisions.
///
/// This is a copy of the ancestor's tag and attributes, never a reference to
/// the ancestor node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParentContext {
    pub tag: SmolStr,
    pub attributes: Attributes,
    /// The child is the main content of a layout component.
    pub is_primary_component: bool,
}

/// A node after directive evaluation. Every downstream stage consumes these.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SemanticNode {
    /// Tag name, [`TEXT_TAG`] for text, [`SUPPRESSED_TAG`] for removed nodes.
    pub tag: SmolStr,
    /// Evaluated attributes in declaration order.
    pub attributes: Attributes,
    /// Owned children. Never shared with another node.
    pub children: Vec<SemanticNode>,
    /// Text content, present only on text nodes.
    pub text: Option<String>,
    pub parent_context: Option<ParentContext>,
    pub span: Span,
}

impl SemanticNode {
    /// Create an element node.
    pub fn element(tag: impl Into<SmolStr>, attributes: Attributes, span: Span) -> Self {
        Self {
            tag: tag.into(),
            attributes,
            children: Vec::new(),
            text: None,
            parent_context: None,
            span,
        }
    }

    /// Create a text leaf.
    pub fn text(content: impl Into<String>, span: Span) -> Self {
        Self {
            tag: TEXT_TAG.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
            text: Some(content.into()),
            parent_context: None,
            span,
        }
    }

    /// The sentinel for a node removed by a directive.
    pub fn suppressed(span: Span) -> Self {
        Self::element(SUPPRESSED_TAG, Attributes::new(), span)
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    pub fn is_suppressed(&self) -> bool {
        self.tag == SUPPRESSED_TAG
    }

    /// Quasar components use the `q-` prefix.
    pub fn is_quasar_component(&self) -> bool {
        self.tag.starts_with("q-")
    }

    /// Get an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether a boolean-style attribute is on (`dense`, `dense=""`,
    /// `dense="true"`).
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.attr(name), Some("" | "true"))
    }

    /// Whitespace-separated entries of the `class` attribute, in order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Non-suppressed element children.
    pub fn child_elements(&self) -> impl Iterator<Item = &SemanticNode> {
        self.children
            .iter()
            .filter(|c| !c.is_text() && !c.is_suppressed())
    }

    /// Concatenated text of this node's subtree, single-space separated.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        collect_text(self, &mut parts);
        parts.join(" ")
    }

    /// Attach a parent context to every direct child.
    pub fn push_context_to_children(&mut self, is_primary_component: bool) {
        let context = ParentContext {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            is_primary_component,
        };
        for child in &mut self.children {
            child.parent_context = Some(context.clone());
        }
    }
}

fn collect_text<'a>(node: &'a SemanticNode, out: &mut Vec<&'a str>) {
    if let Some(text) = node.text.as_deref().filter(|t| !t.is_empty()) {
        out.push(text);
    }
    for child in &node.children {
        collect_text(child, out);
    }
}

impl From<&SemanticNode> for GenericElement {
    /// Turn a normalized node back into parser output so it can be fed
    /// through the normalizer again.
    fn from(node: &SemanticNode) -> Self {
        let children = node
            .children
            .iter()
            .filter(|c| !c.is_suppressed())
            .map(|child| match &child.text {
                Some(text) if child.is_text() => {
                    GenericNode::Text(TextNode::new(text.clone(), child.span))
                }
                _ => GenericNode::Element(GenericElement::from(child)),
            })
            .collect();
        GenericElement {
            tag: node.tag.clone(),
            attrs: node.attributes.clone(),
            children,
            self_closing: false,
            span: node.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flags_and_classes() {
        let mut attrs = Attributes::new();
        attrs.insert("dense".into(), String::new());
        attrs.insert("flat".into(), "false".into());
        attrs.insert("class".into(), "  q-pa-md   row ".into());
        let node = SemanticNode::element("q-btn", attrs, Span::default());

        assert!(node.flag("dense"));
        assert!(!node.flag("flat"));
        assert!(!node.flag("round"));
        assert_eq!(node.classes().collect::<Vec<_>>(), vec!["q-pa-md", "row"]);
    }

    #[test]
    fn test_text_content_joins_descendants() {
        let mut node = SemanticNode::element("div", Attributes::new(), Span::default());
        node.children.push(SemanticNode::text("Hello", Span::default()));
        let mut inner = SemanticNode::element("b", Attributes::new(), Span::default());
        inner.children.push(SemanticNode::text("world", Span::default()));
        node.children.push(inner);

        assert_eq!(node.text_content(), "Hello world");
    }

    #[test]
    fn test_push_context_copies_parent_scalars() {
        let mut attrs = Attributes::new();
        attrs.insert("flat".into(), String::new());
        let mut card = SemanticNode::element("q-card", attrs, Span::default());
        card.children.push(SemanticNode::element("q-btn", Attributes::new(), Span::default()));
        card.push_context_to_children(true);

        let ctx = card.children[0].parent_context.as_ref().unwrap();
        assert_eq!(ctx.tag, "q-card");
        assert!(ctx.attributes.contains_key("flat"));
        assert!(ctx.is_primary_component);
    }
}
