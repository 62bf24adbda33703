use super::{apply_frame_style, append, container, text};
use crate::error::ProcessorError;
use crate::fonts::TextOptions;
use crate::registry::{ProcessContext, Processor};
use crate::target::{NodeId, RenderProperty};
use async_trait::async_trait;
use quasar_style::{classify, Color, LayoutDirection, ResolvedStyle};
use quasar_template::SemanticNode;

/// Fallback for every tag without a usable specific processor.
///
/// Produces a vertical auto-sized frame named after the tag. Quasar tags
/// with no registered processor also get a label and an attribute dump so
/// unmapped components stand out. Never fails.
pub struct GenericProcessor;

#[async_trait]
impl Processor for GenericProcessor {
    async fn process(
        &self,
        node: &SemanticNode,
        style: &ResolvedStyle,
        cx: &mut ProcessContext<'_>,
    ) -> Result<NodeId, ProcessorError> {
        let unmapped = node.is_quasar_component() && !cx.registry.has_processor(&classify(&node.tag));

        let mut defaults = vec![
            RenderProperty::Layout(LayoutDirection::Vertical),
            RenderProperty::HugContents(true),
            RenderProperty::Fill(None),
        ];
        if unmapped {
            defaults.push(RenderProperty::CornerRadius(4.0));
        }
        let frame = container(cx, &node.tag, defaults);
        apply_frame_style(cx.target, frame, style);

        if unmapped {
            if let Err(err) = annotate(node, frame, cx).await {
                tracing::warn!(%err, "could not annotate unmapped component");
            }
        }
        Ok(frame)
    }
}

async fn annotate(
    node: &SemanticNode,
    frame: NodeId,
    cx: &mut ProcessContext<'_>,
) -> Result<(), ProcessorError> {
    let label = TextOptions {
        family: "Inter".to_string(),
        ..TextOptions::default()
    }
    .size(16.0)
    .weight(500)
    .color(Color::grey(0.4));
    let title = text(cx, &node.tag, &format!("Componente {}", node.tag), &label).await?;
    append(cx, &node.tag, frame, title)?;

    if node.attributes.is_empty() {
        return Ok(());
    }
    let dump = node
        .attributes
        .iter()
        .map(|(name, value)| format!("{}=\"{}\"", name, value))
        .collect::<Vec<_>>()
        .join(" ");
    let options = TextOptions::default().size(12.0).color(Color::grey(0.5));
    let attrs = text(cx, &node.tag, &dump, &options).await?;
    append(cx, &node.tag, frame, attrs)
}

#[cfg(test)]
mod tests {
    use super::super::testing::render;
    use pretty_assertions::assert_eq;
    use quasar_style::LayoutDirection;

    #[tokio::test]
    async fn test_unmapped_component_is_annotated() {
        let card = render(r#"<q-card flat class="q-pa-md"></q-card>"#).await;
        assert_eq!(card.name(), "q-card");
        assert_eq!(card.props.corner_radius, Some(4.0));
        assert_eq!(card.props.padding, Some([16.0, 16.0, 16.0, 16.0]));
        let texts = card.texts();
        assert_eq!(texts, vec!["Componente q-card", r#"flat="" class="q-pa-md""#]);
    }

    #[tokio::test]
    async fn test_html_element_is_bare_frame() {
        let div = render(r#"<div class="row"></div>"#).await;
        assert_eq!(div.name(), "div");
        assert_eq!(div.props.layout, Some(LayoutDirection::Horizontal));
        assert!(div.children.is_empty());
        assert_eq!(div.props.corner_radius, None);
    }
}
