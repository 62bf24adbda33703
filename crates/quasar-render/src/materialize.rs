//! Tree materializer.
//!
//! Walks a semantic tree depth-first, pre-order, and turns every node into
//! render nodes through the processor registry. A node is fully styled and
//! attached before any of its children is visited, so render order matches
//! document order.

use crate::error::ConvertError;
use crate::fonts::{self, TextOptions};
use crate::processors::is_self_managing;
use crate::registry::{ProcessContext, ProcessorRegistry};
use crate::settings::ConversionSettings;
use crate::target::{set_properties, NodeId, NodeKind, RenderProperty, RenderTarget};
use quasar_style::{
    analyze_colors, classify, contrast_text_color, resolve_styles, Category, CounterAlign,
    Dimension, LayoutDirection, ResolvedStyle,
};
use quasar_template::SemanticNode;
use rustc_hash::FxHashSet;
use std::fmt::Write as _;

/// Lifecycle of one node during materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Pending,
    Classified,
    Dispatched,
    StyledAndColored,
    Attached,
    ChildrenProcessed,
    ChildrenSkipped,
    Done,
}

/// Structural identity of a node: ancestor path with sibling indices, tag
/// and serialized attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey(String);

impl NodeKey {
    fn new(path: &str, node: &SemanticNode) -> Self {
        let mut key = format!("{}|", path);
        for (name, value) in &node.attributes {
            let _ = write!(key, "{}={};", name, value);
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Nodes already dispatched in one run. The first visit wins.
#[derive(Debug, Default)]
pub struct ProcessedNodeMarker {
    seen: FxHashSet<NodeKey>,
}

impl ProcessedNodeMarker {
    /// Mark `key`; `false` when it was already marked.
    pub fn mark(&mut self, key: NodeKey) -> bool {
        self.seen.insert(key)
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Give children of layout components a parent context.
pub fn push_layout_context(node: &mut SemanticNode) {
    if classify(&node.tag).category == Category::Layout {
        node.push_context_to_children(true);
    }
    for child in &mut node.children {
        push_layout_context(child);
    }
}

/// One scheduled node.
struct Visit<'n> {
    node: &'n SemanticNode,
    parent: NodeId,
    parent_layout: LayoutDirection,
    /// Resolved style of the nearest rendered ancestor.
    ancestor: ResolvedStyle,
    path: String,
}

pub struct Materializer<'a> {
    registry: &'a ProcessorRegistry,
    settings: &'a ConversionSettings,
    marker: ProcessedNodeMarker,
}

impl<'a> Materializer<'a> {
    pub fn new(registry: &'a ProcessorRegistry, settings: &'a ConversionSettings) -> Self {
        Self {
            registry,
            settings,
            marker: ProcessedNodeMarker::default(),
        }
    }

    pub fn marker(&self) -> &ProcessedNodeMarker {
        &self.marker
    }

    /// Render `root` and its subtree under `parent`.
    ///
    /// Returns the render node created for `root`, or `None` when nothing
    /// was created (suppressed root, blank text, already processed).
    pub async fn materialize(
        &mut self,
        target: &mut dyn RenderTarget,
        root: &SemanticNode,
        parent: NodeId,
    ) -> Result<Option<NodeId>, ConvertError> {
        let mut cx = ProcessContext::new(target, self.settings, self.registry);
        let mut created = None;
        let mut stack = vec![Visit {
            node: root,
            parent,
            parent_layout: LayoutDirection::Vertical,
            ancestor: ResolvedStyle::default(),
            path: format!("0:{}", root.tag),
        }];

        while let Some(visit) = stack.pop() {
            let node = if visit.node.is_text() {
                self.visit_text(&visit, &mut cx).await?
            } else {
                self.visit_element(visit, &mut cx, &mut stack).await?
            };
            if created.is_none() {
                created = node;
            }
        }
        Ok(created)
    }

    async fn visit_text(
        &mut self,
        visit: &Visit<'_>,
        cx: &mut ProcessContext<'_>,
    ) -> Result<Option<NodeId>, ConvertError> {
        let content = visit.node.text.as_deref().unwrap_or("").trim();
        if content.is_empty() {
            return Ok(None);
        }
        let options = TextOptions::from_style(&visit.ancestor);
        let text = fonts::create_text(cx.target, content, &options).await?;
        cx.target.append_child(visit.parent, text)?;
        tracing::debug!(node = %text, state = ?NodeState::Done, "text");
        Ok(Some(text))
    }

    async fn visit_element<'n>(
        &mut self,
        visit: Visit<'n>,
        cx: &mut ProcessContext<'_>,
        stack: &mut Vec<Visit<'n>>,
    ) -> Result<Option<NodeId>, ConvertError> {
        let node = visit.node;
        if node.is_suppressed() {
            return Ok(None);
        }
        let tag = node.tag.as_str();
        let trace = |state: NodeState| tracing::debug!(tag, ?state, "materialize");
        trace(NodeState::Pending);

        let key = NodeKey::new(&visit.path, node);
        if self.marker.contains(&key) {
            tracing::debug!(tag, key = key.as_str(), "node already processed, skipping");
            return Ok(None);
        }

        let component = classify(tag);
        let mut style = resolve_styles(node, Some(&visit.ancestor));
        trace(NodeState::Classified);

        self.marker.mark(key);
        trace(NodeState::Dispatched);
        let specific = self.registry.specific(&component, self.settings);
        let mut self_managed = false;
        let id = match specific {
            Some(processor) => match processor.process(node, &style, cx).await {
                Ok(id) => {
                    self_managed = is_self_managing(tag);
                    id
                }
                Err(err) => {
                    tracing::warn!(%err, %component, "processor failed, using generic fallback");
                    self.generic(node, &style, cx).await?
                }
            },
            None => self.generic(node, &style, cx).await?,
        };

        let kind = cx.target.kind(id);
        self.apply_fill_size(cx, id, &style, visit.parent_layout);
        if let Some(text_color) = self.apply_colors(cx, id, kind, node) {
            style.text_color = Some(text_color);
        }
        trace(NodeState::StyledAndColored);

        cx.target.append_child(visit.parent, id)?;
        trace(NodeState::Attached);

        if self_managed {
            trace(NodeState::ChildrenSkipped);
        } else if !kind.is_some_and(|k| k.is_container()) {
            tracing::debug!(tag, "processor produced a leaf, children not rendered");
            trace(NodeState::ChildrenSkipped);
        } else {
            let layout = style.layout.unwrap_or(LayoutDirection::Vertical);
            let scheduled = stack.len();
            for (index, child) in node.children.iter().enumerate() {
                if child.is_suppressed() {
                    continue;
                }
                stack.push(Visit {
                    node: child,
                    parent: id,
                    parent_layout: layout,
                    ancestor: style.clone(),
                    path: format!("{}/{}:{}", visit.path, index, child.tag),
                });
            }
            stack[scheduled..].reverse();
            trace(NodeState::ChildrenProcessed);
        }
        trace(NodeState::Done);
        Ok(Some(id))
    }

    async fn generic(
        &self,
        node: &SemanticNode,
        style: &ResolvedStyle,
        cx: &mut ProcessContext<'_>,
    ) -> Result<NodeId, ConvertError> {
        self.registry
            .generic()
            .process(node, style, cx)
            .await
            .map_err(|err| ConvertError::Render(err.to_string()))
    }

    /// Map `100%` sizes to stretching in the parent's auto layout.
    fn apply_fill_size(
        &self,
        cx: &mut ProcessContext<'_>,
        id: NodeId,
        style: &ResolvedStyle,
        parent_layout: LayoutDirection,
    ) {
        let axes = [
            (style.width, LayoutDirection::Vertical, "width"),
            (style.height, LayoutDirection::Horizontal, "height"),
        ];
        for (dimension, counter_parent, axis) in axes {
            if dimension != Some(Dimension::Fill) {
                continue;
            }
            if !self.settings.use_auto_layout_stretch {
                tracing::warn!(axis, node = %id, "100% size ignored, auto-layout stretch is off");
                continue;
            }
            // Full size across the parent's axis is align-self stretch,
            // along it is grow.
            let property = if parent_layout == counter_parent {
                RenderProperty::AlignSelf(CounterAlign::Stretch)
            } else {
                RenderProperty::Stretch(true)
            };
            set_properties(cx.target, id, [property]);
        }
    }

    /// Paint the palette colors the node names, unless a processor already
    /// did. Returns the text color descendants should use.
    fn apply_colors(
        &self,
        cx: &mut ProcessContext<'_>,
        id: NodeId,
        kind: Option<NodeKind>,
        node: &SemanticNode,
    ) -> Option<quasar_style::Color> {
        if !self.settings.preserve_source_colors || cx.is_colored(id) {
            return None;
        }
        let analysis = analyze_colors(node);
        if analysis.is_empty() {
            return None;
        }

        let background = analysis.effective_background().map(|c| c.color);
        let text_color = analysis
            .text_color
            .as_ref()
            .map(|c| c.color)
            .or_else(|| background.map(contrast_text_color));

        let mut properties = Vec::new();
        if kind == Some(NodeKind::Text) {
            let fill = analysis.text_color.as_ref().or(analysis.main_color.as_ref());
            properties.extend(fill.map(|c| RenderProperty::Fill(Some(c.color))));
        } else {
            properties.extend(background.map(|c| RenderProperty::Fill(Some(c))));
            properties.extend(
                analysis
                    .border_color
                    .as_ref()
                    .map(|c| RenderProperty::Stroke(c.color)),
            );
        }
        set_properties(cx.target, id, properties);
        cx.mark_colored(id);
        text_color
    }
}
