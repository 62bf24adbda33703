//! Processor lookup by component type.

use crate::error::ProcessorError;
use crate::fonts::{self, TextOptions};
use crate::processors::{
    AvatarProcessor, ButtonProcessor, GenericProcessor, IconProcessor, ItemLabelProcessor,
    ItemProcessor, ItemSectionProcessor, ListProcessor,
};
use crate::settings::ConversionSettings;
use crate::target::{NodeId, RenderTarget};
use async_trait::async_trait;
use quasar_style::{classify, resolve_styles, Category, ComponentType, ResolvedStyle};
use quasar_template::SemanticNode;
use rustc_hash::{FxHashMap, FxHashSet};
use std::future::Future;
use std::pin::Pin;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Shared state handed to processors during one conversion.
pub struct ProcessContext<'a> {
    pub target: &'a mut dyn RenderTarget,
    pub settings: &'a ConversionSettings,
    pub registry: &'a ProcessorRegistry,
    colored: FxHashSet<NodeId>,
}

impl<'a> ProcessContext<'a> {
    pub fn new(
        target: &'a mut dyn RenderTarget,
        settings: &'a ConversionSettings,
        registry: &'a ProcessorRegistry,
    ) -> Self {
        Self {
            target,
            settings,
            registry,
            colored: FxHashSet::default(),
        }
    }

    /// Record that `node` has its final colors. Later passes leave them
    /// alone.
    pub fn mark_colored(&mut self, node: NodeId) {
        self.colored.insert(node);
    }

    pub fn is_colored(&self, node: NodeId) -> bool {
        self.colored.contains(&node)
    }

    /// Render a nested node through the registry, for processors that
    /// place their own children.
    ///
    /// A failing processor is replaced by the generic one for this node
    /// only, so the caller keeps its other children. Generic frames get
    /// their children placed the same way.
    pub fn render_nested<'b>(
        &'b mut self,
        node: &'b SemanticNode,
        ancestor: &'b ResolvedStyle,
    ) -> BoxFuture<'b, Result<NodeId, ProcessorError>> {
        Box::pin(async move {
            let component = classify(&node.tag);
            let style = resolve_styles(node, Some(ancestor));
            let registry = self.registry;

            if let Some(processor) = registry.specific(&component, self.settings) {
                match processor.process(node, &style, self).await {
                    Ok(id) => return Ok(id),
                    Err(err) => {
                        tracing::warn!(%err, %component, "nested processor failed, using generic fallback");
                    }
                }
            }

            let id = registry.generic().process(node, &style, self).await?;
            if self.target.kind(id).is_some_and(|k| k.is_container()) {
                self.place_generic_children(node, &style, id).await?;
            }
            Ok(id)
        })
    }

    async fn place_generic_children(
        &mut self,
        node: &SemanticNode,
        style: &ResolvedStyle,
        parent: NodeId,
    ) -> Result<(), ProcessorError> {
        let tag = node.tag.as_str();
        for child in &node.children {
            if child.is_suppressed() {
                continue;
            }
            let id = if child.is_text() {
                let content = child.text.as_deref().unwrap_or("").trim();
                if content.is_empty() {
                    continue;
                }
                fonts::create_text(self.target, content, &TextOptions::from_style(style))
                    .await
                    .map_err(|err| ProcessorError::wrap(tag, err))?
            } else {
                self.render_nested(child, style).await?
            };
            self.target
                .append_child(parent, id)
                .map_err(|err| ProcessorError::wrap(tag, err))?;
        }
        Ok(())
    }
}

/// Turns one semantic node into a render node.
///
/// Processors must be idempotent: equivalent input gives equivalent output.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(
        &self,
        node: &SemanticNode,
        style: &ResolvedStyle,
        cx: &mut ProcessContext<'_>,
    ) -> Result<NodeId, ProcessorError>;
}

/// Table of processors keyed by `(category, kind)` plus a generic fallback.
pub struct ProcessorRegistry {
    processors: FxHashMap<ComponentType, Box<dyn Processor>>,
    generic: Box<dyn Processor>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ProcessorRegistry {
    /// An empty registry; everything goes to the generic processor.
    pub fn new() -> Self {
        Self {
            processors: FxHashMap::default(),
            generic: Box::new(GenericProcessor),
        }
    }

    /// A registry with every built-in processor.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Category::Basic, "btn", ButtonProcessor);
        registry.register(Category::Basic, "icon", IconProcessor);
        registry.register(Category::Basic, "avatar", AvatarProcessor);
        registry.register(Category::Display, "list", ListProcessor);
        registry.register(Category::Display, "item", ItemProcessor);
        registry.register(Category::Display, "item-section", ItemSectionProcessor);
        registry.register(Category::Display, "item-label", ItemLabelProcessor);
        registry
    }

    /// Register `processor` for `(category, kind)`, replacing any earlier
    /// entry. Returns whether an entry was replaced.
    pub fn register(
        &mut self,
        category: Category,
        kind: &str,
        processor: impl Processor + 'static,
    ) -> bool {
        self.processors
            .insert(ComponentType::new(category, kind), Box::new(processor))
            .is_some()
    }

    pub fn has_processor(&self, component: &ComponentType) -> bool {
        self.processors.contains_key(component)
    }

    /// The processor `dispatch` would pick, `None` meaning the generic one.
    pub fn specific(
        &self,
        component: &ComponentType,
        settings: &ConversionSettings,
    ) -> Option<&dyn Processor> {
        if !settings.is_category_enabled(component.category) {
            return None;
        }
        self.processors.get(component).map(|p| p.as_ref())
    }

    pub fn generic(&self) -> &dyn Processor {
        self.generic.as_ref()
    }

    /// Run the processor for `component`, or the generic one when none is
    /// registered or its category is disabled.
    pub async fn dispatch(
        &self,
        node: &SemanticNode,
        component: &ComponentType,
        style: &ResolvedStyle,
        cx: &mut ProcessContext<'_>,
    ) -> Result<NodeId, ProcessorError> {
        match self.specific(component, cx.settings) {
            Some(processor) => processor.process(node, style, cx).await,
            None => self.generic.process(node, style, cx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingTarget;
    use crate::target::RenderProperty;
    use pretty_assertions::assert_eq;
    use quasar_template::Attributes;

    struct Named(&'static str);

    #[async_trait]
    impl Processor for Named {
        async fn process(
            &self,
            _node: &SemanticNode,
            _style: &ResolvedStyle,
            cx: &mut ProcessContext<'_>,
        ) -> Result<NodeId, ProcessorError> {
            let frame = cx.target.create_container();
            cx.target
                .set_property(frame, RenderProperty::Name(self.0.into()))
                .map_err(|e| ProcessorError::wrap("test", e))?;
            Ok(frame)
        }
    }

    fn node(tag: &str) -> SemanticNode {
        SemanticNode::element(tag, Attributes::new(), Default::default())
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let mut registry = ProcessorRegistry::new();
        assert!(!registry.register(Category::Layout, "card", Named("first")));
        assert!(registry.register(Category::Layout, "card", Named("second")));

        let settings = ConversionSettings::default();
        let mut target = RecordingTarget::new();
        let mut cx = ProcessContext::new(&mut target, &settings, &registry);
        let card = node("q-card");
        let id = registry
            .dispatch(&card, &classify("q-card"), &ResolvedStyle::default(), &mut cx)
            .await
            .unwrap();
        assert_eq!(target.props(id).unwrap().name, "second");
    }

    #[tokio::test]
    async fn test_disabled_category_uses_generic() {
        let mut registry = ProcessorRegistry::new();
        registry.register(Category::Layout, "card", Named("card"));
        let mut settings = ConversionSettings::default();
        settings.set_category_enabled(Category::Layout, false);

        let component = classify("q-card");
        assert!(registry.has_processor(&component));
        assert!(registry.specific(&component, &settings).is_none());

        let mut target = RecordingTarget::new();
        let mut cx = ProcessContext::new(&mut target, &settings, &registry);
        let id = registry
            .dispatch(&node("q-card"), &component, &ResolvedStyle::default(), &mut cx)
            .await
            .unwrap();
        assert_eq!(target.props(id).unwrap().name, "q-card");
    }

    #[test]
    fn test_defaults_cover_button_and_list_family() {
        let registry = ProcessorRegistry::with_defaults();
        for tag in ["q-btn", "q-icon", "q-avatar", "q-list", "q-item", "q-item-section", "q-item-label"] {
            assert!(registry.has_processor(&classify(tag)), "{}", tag);
        }
        assert!(!registry.has_processor(&classify("q-card")));
    }
}
