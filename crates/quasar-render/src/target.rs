//! The drawing surface processors write to.
//!
//! A [`RenderTarget`] owns its nodes; callers hold [`NodeId`] handles and
//! mutate nodes through [`RenderTarget::set_property`].

use crate::error::{StyleApplicationError, TargetError};
use async_trait::async_trait;
use quasar_style::{
    AxisAlign, Color, CounterAlign, LayoutDirection, Shadow, TextAlign, TextCase, TextDecoration,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a node owned by a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of render node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Frame,
    Text,
    Rectangle,
    Ellipse,
}

impl NodeKind {
    /// Design-tool type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Frame => "FRAME",
            NodeKind::Text => "TEXT",
            NodeKind::Rectangle => "RECTANGLE",
            NodeKind::Ellipse => "ELLIPSE",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Frame)
    }
}

/// Shape for [`RenderTarget::create_vector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorShape {
    Rectangle,
    Ellipse,
}

/// A font family and style, e.g. `Roboto` / `Medium`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

impl fmt::Display for FontName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

/// One settable property.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderProperty {
    Name(String),
    /// Solid fill; `None` clears it. Text nodes use it as text color.
    Fill(Option<Color>),
    Stroke(Color),
    StrokeWeight(f64),
    CornerRadius(f64),
    Opacity(f64),
    Visible(bool),
    Shadow(Shadow),
    Resize { width: f64, height: f64 },
    Width(f64),
    Height(f64),
    /// Stretch along the parent's auto-layout axis.
    Stretch(bool),
    AlignSelf(CounterAlign),

    Layout(LayoutDirection),
    Padding {
        top: f64,
        right: f64,
        bottom: f64,
        left: f64,
    },
    ItemSpacing(f64),
    PrimaryAlign(AxisAlign),
    CounterAlign(CounterAlign),
    Wrap(bool),
    HugContents(bool),
    ClipsContent(bool),

    Characters(String),
    Font(FontName),
    FontSize(f64),
    LetterSpacing(f64),
    TextAlign(TextAlign),
    TextCase(TextCase),
    TextDecoration(TextDecoration),
}

impl RenderProperty {
    /// Property name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            RenderProperty::Name(_) => "name",
            RenderProperty::Fill(_) => "fill",
            RenderProperty::Stroke(_) => "stroke",
            RenderProperty::StrokeWeight(_) => "stroke-weight",
            RenderProperty::CornerRadius(_) => "corner-radius",
            RenderProperty::Opacity(_) => "opacity",
            RenderProperty::Visible(_) => "visible",
            RenderProperty::Shadow(_) => "shadow",
            RenderProperty::Resize { .. } => "resize",
            RenderProperty::Width(_) => "width",
            RenderProperty::Height(_) => "height",
            RenderProperty::Stretch(_) => "stretch",
            RenderProperty::AlignSelf(_) => "align-self",
            RenderProperty::Layout(_) => "layout",
            RenderProperty::Padding { .. } => "padding",
            RenderProperty::ItemSpacing(_) => "item-spacing",
            RenderProperty::PrimaryAlign(_) => "primary-align",
            RenderProperty::CounterAlign(_) => "counter-align",
            RenderProperty::Wrap(_) => "wrap",
            RenderProperty::HugContents(_) => "hug-contents",
            RenderProperty::ClipsContent(_) => "clips-content",
            RenderProperty::Characters(_) => "characters",
            RenderProperty::Font(_) => "font",
            RenderProperty::FontSize(_) => "font-size",
            RenderProperty::LetterSpacing(_) => "letter-spacing",
            RenderProperty::TextAlign(_) => "text-align",
            RenderProperty::TextCase(_) => "text-case",
            RenderProperty::TextDecoration(_) => "text-decoration",
        }
    }

    /// Whether a node of `kind` has this property.
    pub fn applies_to(&self, kind: NodeKind) -> bool {
        use RenderProperty::*;
        match self {
            Name(_) | Fill(_) | Opacity(_) | Visible(_) | Shadow(_) | Resize { .. }
            | Width(_) | Height(_) | Stretch(_) | AlignSelf(_) => true,
            Stroke(_) | StrokeWeight(_) => kind != NodeKind::Text,
            CornerRadius(_) => matches!(kind, NodeKind::Frame | NodeKind::Rectangle),
            Layout(_) | Padding { .. } | ItemSpacing(_) | PrimaryAlign(_) | CounterAlign(_)
            | Wrap(_) | HugContents(_) | ClipsContent(_) => kind == NodeKind::Frame,
            Characters(_) | Font(_) | FontSize(_) | LetterSpacing(_) | TextAlign(_)
            | TextCase(_) | TextDecoration(_) => kind == NodeKind::Text,
        }
    }

    /// Check `applies_to`, producing the error a target reports.
    pub fn check(&self, node: NodeId, kind: NodeKind) -> Result<(), StyleApplicationError> {
        if self.applies_to(kind) {
            Ok(())
        } else {
            Err(StyleApplicationError {
                property: self.name(),
                node,
                kind,
            })
        }
    }
}

/// Drawing primitives consumed by processors and the materializer.
///
/// Node creation is synchronous; font loading may suspend.
#[async_trait]
pub trait RenderTarget: Send {
    fn create_container(&mut self) -> NodeId;

    fn create_text(&mut self) -> NodeId;

    fn create_vector(&mut self, shape: VectorShape) -> NodeId;

    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Set one property. Fails when the property does not apply to the
    /// node's kind; the node is left unchanged.
    fn set_property(&mut self, node: NodeId, property: RenderProperty) -> Result<(), TargetError>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TargetError>;

    fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId)
        -> Result<(), TargetError>;

    /// Try to make `font` usable; `false` when it is not available.
    async fn load_font(&mut self, font: &FontName) -> bool;
}

/// Set several properties, logging and skipping the ones that do not apply.
pub fn set_properties(
    target: &mut dyn RenderTarget,
    node: NodeId,
    properties: impl IntoIterator<Item = RenderProperty>,
) {
    for property in properties {
        if let Err(err) = target.set_property(node, property) {
            tracing::warn!(%err, "skipping style property");
        }
    }
}
