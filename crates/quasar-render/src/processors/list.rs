//! The `q-list` family. Each member places its own children.

use super::{apply_frame_style, append, container, density_padding, padding, text};
use crate::error::ProcessorError;
use crate::fonts::TextOptions;
use crate::registry::{ProcessContext, Processor};
use crate::target::{set_properties, NodeId, RenderProperty, VectorShape};
use async_trait::async_trait;
use quasar_style::{AxisAlign, Color, CounterAlign, LayoutDirection, ResolvedStyle, TextCase};
use quasar_template::SemanticNode;

const SEPARATOR_COLOR: Color = Color::grey(0.9);

/// Render every child of `node` into `parent`: non-blank text as text
/// nodes, elements through the registry. Returns how many were placed.
async fn place_children(
    node: &SemanticNode,
    style: &ResolvedStyle,
    parent: NodeId,
    cx: &mut ProcessContext<'_>,
) -> Result<usize, ProcessorError> {
    let tag = node.tag.as_str();
    let mut placed = 0;
    for child in &node.children {
        if child.is_suppressed() {
            continue;
        }
        let rendered = if child.is_text() {
            let value = child.text.as_deref().unwrap_or("").trim();
            if value.is_empty() {
                continue;
            }
            text(cx, tag, value, &TextOptions::from_style(style)).await?
        } else {
            cx.render_nested(child, style).await?
        };
        append(cx, tag, parent, rendered)?;
        placed += 1;
    }
    Ok(placed)
}

/// `q-list`: a vertical stack of items, optionally bordered and separated.
pub struct ListProcessor;

#[async_trait]
impl Processor for ListProcessor {
    async fn process(
        &self,
        node: &SemanticNode,
        style: &ResolvedStyle,
        cx: &mut ProcessContext<'_>,
    ) -> Result<NodeId, ProcessorError> {
        let tag = node.tag.as_str();
        let list = container(
            cx,
            "q-list",
            [
                RenderProperty::Layout(LayoutDirection::Vertical),
                RenderProperty::HugContents(true),
                RenderProperty::ItemSpacing(0.0),
                RenderProperty::Fill(Some(Color::WHITE)),
            ],
        );
        apply_frame_style(cx.target, list, style);
        if node.flag("bordered") {
            set_properties(
                cx.target,
                list,
                [
                    RenderProperty::Stroke(Color::grey(0.88)),
                    RenderProperty::StrokeWeight(1.0),
                ],
            );
        }

        let separated = node.flag("separator");
        for (index, item) in node.child_elements().enumerate() {
            if separated && index > 0 {
                let line = cx.target.create_vector(VectorShape::Rectangle);
                set_properties(
                    cx.target,
                    line,
                    [
                        RenderProperty::Name("q-separator".into()),
                        RenderProperty::Height(1.0),
                        RenderProperty::Stretch(true),
                        RenderProperty::Fill(Some(SEPARATOR_COLOR)),
                    ],
                );
                append(cx, tag, list, line)?;
            }
            let rendered = cx.render_nested(item, style).await?;
            append(cx, tag, list, rendered)?;
        }
        Ok(list)
    }
}

/// `q-item`: a horizontal row of sections.
pub struct ItemProcessor;

#[async_trait]
impl Processor for ItemProcessor {
    async fn process(
        &self,
        node: &SemanticNode,
        style: &ResolvedStyle,
        cx: &mut ProcessContext<'_>,
    ) -> Result<NodeId, ProcessorError> {
        let name = if node.flag("clickable") {
            "q-item (clickable)"
        } else {
            "q-item"
        };
        let (vertical, horizontal) =
            density_padding(cx.settings.density, node.flag("dense"), (12.0, 16.0), (8.0, 16.0));

        let item = container(
            cx,
            name,
            [
                RenderProperty::Layout(LayoutDirection::Horizontal),
                RenderProperty::HugContents(true),
                padding(vertical, horizontal),
                RenderProperty::PrimaryAlign(AxisAlign::SpaceBetween),
                RenderProperty::CounterAlign(CounterAlign::Center),
                RenderProperty::ItemSpacing(16.0),
                RenderProperty::Fill(Some(Color::WHITE)),
            ],
        );
        apply_frame_style(cx.target, item, style);

        if place_children(node, style, item, cx).await? == 0 {
            let label = text(cx, &node.tag, "Item", &TextOptions::from_style(style)).await?;
            append(cx, &node.tag, item, label)?;
        }
        Ok(item)
    }
}

/// `q-item-section`: a vertical column inside an item. `avatar` sections
/// are fixed-size slots, `side` sections hug the trailing edge.
pub struct ItemSectionProcessor;

#[async_trait]
impl Processor for ItemSectionProcessor {
    async fn process(
        &self,
        node: &SemanticNode,
        style: &ResolvedStyle,
        cx: &mut ProcessContext<'_>,
    ) -> Result<NodeId, ProcessorError> {
        let tag = node.tag.as_str();
        let avatar = node.flag("avatar") || node.flag("thumbnail");

        let section = if avatar {
            container(
                cx,
                "q-item-section--avatar",
                [
                    RenderProperty::Layout(LayoutDirection::Vertical),
                    RenderProperty::Resize {
                        width: 56.0,
                        height: 56.0,
                    },
                    RenderProperty::HugContents(false),
                    RenderProperty::PrimaryAlign(AxisAlign::Center),
                    RenderProperty::CounterAlign(CounterAlign::Center),
                    RenderProperty::Fill(None),
                ],
            )
        } else {
            let name = if node.flag("side") {
                "q-item-section--side"
            } else {
                "q-item-section"
            };
            let align = if node.flag("side") {
                CounterAlign::Max
            } else {
                CounterAlign::Min
            };
            container(
                cx,
                name,
                [
                    RenderProperty::Layout(LayoutDirection::Vertical),
                    RenderProperty::HugContents(true),
                    RenderProperty::ItemSpacing(4.0),
                    RenderProperty::CounterAlign(align),
                    RenderProperty::Fill(None),
                ],
            )
        };
        apply_frame_style(cx.target, section, style);

        let placed = place_children(node, style, section, cx).await?;
        if avatar && placed == 0 {
            let placeholder = cx.target.create_vector(VectorShape::Ellipse);
            set_properties(
                cx.target,
                placeholder,
                [
                    RenderProperty::Name("avatar-placeholder".into()),
                    RenderProperty::Resize {
                        width: 40.0,
                        height: 40.0,
                    },
                    RenderProperty::Fill(Some(Color::grey(0.8))),
                ],
            );
            append(cx, tag, section, placeholder)?;
        }
        Ok(section)
    }
}

/// `q-item-label`: a single text node. `caption`, `header` and `overline`
/// select the typographic variant.
pub struct ItemLabelProcessor;

#[async_trait]
impl Processor for ItemLabelProcessor {
    async fn process(
        &self,
        node: &SemanticNode,
        style: &ResolvedStyle,
        cx: &mut ProcessContext<'_>,
    ) -> Result<NodeId, ProcessorError> {
        let content = node.text_content();
        let content = match content.trim() {
            "" => "Label",
            trimmed => trimmed,
        };

        let base = TextOptions::from_style(style).size(14.0);
        let options = if node.flag("caption") {
            base.size(12.0).color(Color::grey(0.6))
        } else if node.flag("header") {
            base.size(16.0).weight(500)
        } else if node.flag("overline") {
            TextOptions {
                letter_spacing: Some(1.0),
                case: Some(TextCase::Upper),
                ..base.size(12.0)
            }
        } else {
            base
        };

        let label = text(cx, &node.tag, content, &options).await?;
        set_properties(cx.target, label, [RenderProperty::Name("q-item-label".into())]);
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{render, render_with};
    use super::*;
    use crate::settings::{ConversionSettings, Density};
    use crate::target::NodeKind;
    use pretty_assertions::assert_eq;

    const CONTACTS: &str = r#"<q-list bordered separator>
  <q-item clickable>
    <q-item-section avatar><q-avatar color="primary">AL</q-avatar></q-item-section>
    <q-item-section>
      <q-item-label>Ada Lovelace</q-item-label>
      <q-item-label caption>Analyst</q-item-label>
    </q-item-section>
    <q-item-section side><q-icon name="mail" /></q-item-section>
  </q-item>
  <q-item>
    <q-item-section avatar></q-item-section>
  </q-item>
</q-list>"#;

    #[tokio::test]
    async fn test_list_with_separator_between_items() {
        let list = render(CONTACTS).await;
        assert_eq!(list.name(), "q-list");
        assert!(list.props.stroke.is_some());
        let names: Vec<&str> = list.children.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["q-item (clickable)", "q-separator", "q-item"]);
        assert_eq!(list.child(1).unwrap().props.height, Some(1.0));
    }

    #[tokio::test]
    async fn test_item_sections() {
        let list = render(CONTACTS).await;
        let item = list.child(0).unwrap();
        let sections: Vec<&str> = item.children.iter().map(|c| c.name()).collect();
        assert_eq!(
            sections,
            vec!["q-item-section--avatar", "q-item-section", "q-item-section--side"]
        );
        assert_eq!(item.child(0).unwrap().child(0).unwrap().name(), "q-avatar");
        assert_eq!(item.child(2).unwrap().child(0).unwrap().name(), "q-icon");

        let labels = item.child(1).unwrap();
        assert_eq!(labels.children.len(), 2);
        let caption = labels.child(1).unwrap();
        assert_eq!(caption.name(), "q-item-label");
        assert_eq!(caption.props.characters.as_deref(), Some("Analyst"));
        assert_eq!(caption.props.font_size, Some(12.0));
        assert_eq!(caption.props.fill, Some(Color::grey(0.6)));
    }

    #[tokio::test]
    async fn test_empty_avatar_section_placeholder() {
        let list = render(CONTACTS).await;
        let section = list.child(2).unwrap().child(0).unwrap();
        assert_eq!(section.children.len(), 1);
        assert_eq!(section.child(0).unwrap().kind, NodeKind::Ellipse);
        assert_eq!(section.child(0).unwrap().name(), "avatar-placeholder");
    }

    #[tokio::test]
    async fn test_item_padding_and_fallback_text() {
        let item = render("<q-item dense></q-item>").await;
        assert_eq!(item.props.padding, Some([8.0, 16.0, 8.0, 16.0]));
        assert_eq!(item.texts(), vec!["Item"]);

        let settings = ConversionSettings {
            density: Density::Comfortable,
            ..Default::default()
        };
        let item = render_with("<q-item></q-item>", &settings).await;
        assert_eq!(item.props.padding, Some([16.0, 16.0, 16.0, 16.0]));
    }

    #[tokio::test]
    async fn test_label_variants() {
        let overline = render("<q-item-label overline>Section</q-item-label>").await;
        assert_eq!(overline.kind, NodeKind::Text);
        assert_eq!(overline.props.text_case, Some(TextCase::Upper));
        assert_eq!(overline.props.letter_spacing, Some(1.0));

        let empty = render("<q-item-label header></q-item-label>").await;
        assert_eq!(empty.props.characters.as_deref(), Some("Label"));
        assert_eq!(empty.props.font_size, Some(16.0));
    }
}
