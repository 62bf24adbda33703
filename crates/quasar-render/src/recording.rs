//! In-memory render target.
//!
//! Records every node and property so a conversion can be inspected,
//! serialized or replayed onto a real design tool.

use crate::error::TargetError;
use crate::target::{FontName, NodeId, NodeKind, RenderProperty, RenderTarget, VectorShape};
use async_trait::async_trait;
use quasar_style::{
    AxisAlign, Color, CounterAlign, LayoutDirection, Shadow, TextAlign, TextCase, TextDecoration,
};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Property values of one node. Unset fields were never written.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProps {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stretch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_self: Option<CounterAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_align: Option<AxisAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_align: Option<CounterAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hug_contents: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clips_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_case: Option<TextCase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
}

impl NodeProps {
    fn apply(&mut self, property: RenderProperty) {
        match property {
            RenderProperty::Name(name) => self.name = name,
            RenderProperty::Fill(fill) => self.fill = fill,
            RenderProperty::Stroke(c) => self.stroke = Some(c),
            RenderProperty::StrokeWeight(w) => self.stroke_weight = Some(w),
            RenderProperty::CornerRadius(r) => self.corner_radius = Some(r),
            RenderProperty::Opacity(o) => self.opacity = Some(o),
            RenderProperty::Visible(v) => self.visible = Some(v),
            RenderProperty::Shadow(s) => self.shadow = Some(s),
            RenderProperty::Resize { width, height } => {
                self.width = Some(width);
                self.height = Some(height);
            }
            RenderProperty::Width(w) => self.width = Some(w),
            RenderProperty::Height(h) => self.height = Some(h),
            RenderProperty::Stretch(s) => self.stretch = Some(s),
            RenderProperty::AlignSelf(a) => self.align_self = Some(a),
            RenderProperty::Layout(l) => self.layout = Some(l),
            RenderProperty::Padding {
                top,
                right,
                bottom,
                left,
            } => self.padding = Some([top, right, bottom, left]),
            RenderProperty::ItemSpacing(s) => self.item_spacing = Some(s),
            RenderProperty::PrimaryAlign(a) => self.primary_align = Some(a),
            RenderProperty::CounterAlign(a) => self.counter_align = Some(a),
            RenderProperty::Wrap(w) => self.wrap = Some(w),
            RenderProperty::HugContents(h) => self.hug_contents = Some(h),
            RenderProperty::ClipsContent(c) => self.clips_content = Some(c),
            RenderProperty::Characters(c) => self.characters = Some(c),
            RenderProperty::Font(f) => self.font = Some(f),
            RenderProperty::FontSize(s) => self.font_size = Some(s),
            RenderProperty::LetterSpacing(s) => self.letter_spacing = Some(s),
            RenderProperty::TextAlign(a) => self.text_align = Some(a),
            RenderProperty::TextCase(c) => self.text_case = Some(c),
            RenderProperty::TextDecoration(d) => self.text_decoration = Some(d),
        }
    }
}

#[derive(Debug, Clone)]
struct RecordedNode {
    kind: NodeKind,
    props: NodeProps,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Which fonts `load_font` reports as available.
#[derive(Debug, Clone, Default)]
pub enum FontAvailability {
    #[default]
    All,
    Only(FxHashSet<FontName>),
}

/// Render target that keeps everything in memory.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    nodes: Vec<RecordedNode>,
    fonts: FontAvailability,
    font_requests: Vec<FontName>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// A target where only `fonts` load.
    pub fn with_fonts(fonts: impl IntoIterator<Item = FontName>) -> Self {
        Self {
            fonts: FontAvailability::Only(fonts.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Number of nodes created so far, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every font `load_font` was asked for, in order.
    pub fn font_requests(&self) -> &[FontName] {
        &self.font_requests
    }

    pub fn props(&self, node: NodeId) -> Option<&NodeProps> {
        self.nodes.get(node.index()).map(|n| &n.props)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index()).and_then(|n| n.parent)
    }

    /// Owned snapshot of the subtree under `root`.
    pub fn snapshot(&self, root: NodeId) -> Option<RenderNode> {
        let node = self.nodes.get(root.index())?;
        Some(RenderNode {
            id: root,
            kind: node.kind,
            props: node.props.clone(),
            children: node
                .children
                .iter()
                .filter_map(|child| self.snapshot(*child))
                .collect(),
        })
    }

    fn create(&mut self, kind: NodeKind, name: &str) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(RecordedNode {
            kind,
            props: NodeProps {
                name: name.to_string(),
                ..Default::default()
            },
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut RecordedNode, TargetError> {
        self.nodes
            .get_mut(node.index())
            .ok_or(TargetError::UnknownNode(node))
    }

    fn attach(&mut self, parent: NodeId, index: Option<usize>, child: NodeId) -> Result<(), TargetError> {
        if !self.node_mut(parent)?.kind.is_container() {
            return Err(TargetError::NotAContainer(parent));
        }
        let previous = self.node_mut(child)?.parent.replace(parent);
        if let Some(previous) = previous {
            self.node_mut(previous)?.children.retain(|c| *c != child);
        }
        let children = &mut self.node_mut(parent)?.children;
        match index {
            Some(i) if i < children.len() => children.insert(i, child),
            _ => children.push(child),
        }
        Ok(())
    }
}

#[async_trait]
impl RenderTarget for RecordingTarget {
    fn create_container(&mut self) -> NodeId {
        self.create(NodeKind::Frame, "Frame")
    }

    fn create_text(&mut self) -> NodeId {
        self.create(NodeKind::Text, "Text")
    }

    fn create_vector(&mut self, shape: VectorShape) -> NodeId {
        match shape {
            VectorShape::Rectangle => self.create(NodeKind::Rectangle, "Rectangle"),
            VectorShape::Ellipse => self.create(NodeKind::Ellipse, "Ellipse"),
        }
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(node.index()).map(|n| n.kind)
    }

    fn set_property(&mut self, node: NodeId, property: RenderProperty) -> Result<(), TargetError> {
        let recorded = self.node_mut(node)?;
        property.check(node, recorded.kind)?;
        recorded.props.apply(property);
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TargetError> {
        self.attach(parent, None, child)
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), TargetError> {
        self.attach(parent, Some(index), child)
    }

    async fn load_font(&mut self, font: &FontName) -> bool {
        self.font_requests.push(font.clone());
        match &self.fonts {
            FontAvailability::All => true,
            FontAvailability::Only(available) => available.contains(font),
        }
    }
}

/// Owned, serializable render tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(flatten)]
    pub props: NodeProps,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    pub fn name(&self) -> &str {
        &self.props.name
    }

    /// Child by position.
    pub fn child(&self, index: usize) -> Option<&RenderNode> {
        self.children.get(index)
    }

    /// Depth-first, pre-order iterator over this subtree.
    pub fn descendants(&self) -> impl Iterator<Item = &RenderNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// First node in the subtree named `name`.
    pub fn find(&self, name: &str) -> Option<&RenderNode> {
        self.descendants().find(|n| n.name() == name)
    }

    /// Text of every text node in the subtree, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.descendants()
            .filter_map(|n| n.props.characters.as_deref())
            .collect()
    }
}
