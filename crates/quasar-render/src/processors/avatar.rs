use super::{apply_frame_style, append, container, synthetic, text};
use crate::error::ProcessorError;
use crate::fonts::TextOptions;
use crate::registry::{ProcessContext, Processor};
use crate::target::{set_properties, NodeId, RenderProperty, VectorShape};
use async_trait::async_trait;
use quasar_style::{
    analyze_colors, contrast_text_color, parse_length, AxisAlign, Color, CounterAlign,
    LayoutDirection, ResolvedStyle, TextAlign,
};
use quasar_template::SemanticNode;

const DEFAULT_SIZE: f64 = 40.0;

/// `q-avatar`: a circular frame with an image placeholder, an icon or
/// initials.
pub struct AvatarProcessor;

#[async_trait]
impl Processor for AvatarProcessor {
    async fn process(
        &self,
        node: &SemanticNode,
        style: &ResolvedStyle,
        cx: &mut ProcessContext<'_>,
    ) -> Result<NodeId, ProcessorError> {
        let tag = node.tag.as_str();
        let size = node
            .attr("size")
            .and_then(parse_length)
            .unwrap_or(DEFAULT_SIZE);
        let radius = if node.flag("square") {
            0.0
        } else if node.flag("rounded") {
            4.0
        } else {
            size / 2.0
        };

        let analysis = analyze_colors(node);
        let background = analysis.effective_background().map(|c| c.color);
        let text_color = analysis
            .text_color
            .as_ref()
            .map(|c| c.color)
            .or_else(|| background.map(contrast_text_color))
            .unwrap_or(Color::grey(0.2));

        let frame = container(cx, "q-avatar", []);
        apply_frame_style(cx.target, frame, style);
        set_properties(
            cx.target,
            frame,
            [
                RenderProperty::Resize {
                    width: size,
                    height: size,
                },
                RenderProperty::CornerRadius(radius),
                RenderProperty::Layout(LayoutDirection::Horizontal),
                RenderProperty::HugContents(false),
                RenderProperty::PrimaryAlign(AxisAlign::Center),
                RenderProperty::CounterAlign(CounterAlign::Center),
                RenderProperty::ClipsContent(true),
                RenderProperty::Fill(Some(background.unwrap_or(Color::grey(0.8)))),
            ],
        );
        cx.mark_colored(frame);

        if node.child_elements().any(|c| c.tag == "img") {
            let image = cx.target.create_vector(VectorShape::Rectangle);
            set_properties(
                cx.target,
                image,
                [
                    RenderProperty::Name("image-placeholder".into()),
                    RenderProperty::Resize {
                        width: size * 0.8,
                        height: size * 0.8,
                    },
                    RenderProperty::CornerRadius(4.0),
                    RenderProperty::Fill(Some(Color::grey(0.9))),
                ],
            );
            append(cx, tag, frame, image)?;
            return Ok(frame);
        }

        let inner = ResolvedStyle {
            text_color: Some(text_color),
            ..style.inherited()
        };
        let icon_size = format!("{}px", size * 0.6);
        let icon = match node.child_elements().find(|c| c.tag == "q-icon") {
            Some(icon) => Some(cx.render_nested(icon, &inner).await?),
            None => match node.attr("icon") {
                Some(name) => {
                    let icon = synthetic("q-icon", &[("name", name), ("size", &icon_size)], node);
                    Some(cx.render_nested(&icon, &inner).await?)
                }
                None => None,
            },
        };
        if let Some(icon) = icon {
            append(cx, tag, frame, icon)?;
            return Ok(frame);
        }

        let initials: String = node
            .text_content()
            .trim()
            .chars()
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        if !initials.is_empty() {
            let options = TextOptions {
                align: Some(TextAlign::Center),
                ..TextOptions::from_style(style)
            }
            .size(size * 0.5)
            .color(text_color);
            let label = text(cx, tag, &initials, &options).await?;
            append(cx, tag, frame, label)?;
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::render;
    use super::*;
    use crate::target::NodeKind;
    use pretty_assertions::assert_eq;
    use quasar_style::Palette;

    #[tokio::test]
    async fn test_initials_with_contrast_color() {
        let avatar = render(r#"<q-avatar color="primary" size="48px">jd</q-avatar>"#).await;
        let primary = Palette::global().get("primary").unwrap();
        assert_eq!(avatar.props.width, Some(48.0));
        assert_eq!(avatar.props.corner_radius, Some(24.0));
        assert_eq!(avatar.props.fill, Some(primary));
        let label = avatar.child(0).unwrap();
        assert_eq!(label.props.characters.as_deref(), Some("JD"));
        assert_eq!(label.props.font_size, Some(24.0));
        assert_eq!(label.props.fill, Some(contrast_text_color(primary)));
    }

    #[tokio::test]
    async fn test_default_avatar_colors() {
        let avatar = render("<q-avatar>AB</q-avatar>").await;
        assert_eq!(avatar.props.width, Some(DEFAULT_SIZE));
        assert_eq!(avatar.props.fill, Some(Color::grey(0.8)));
        assert_eq!(avatar.child(0).unwrap().props.fill, Some(Color::grey(0.2)));
    }

    #[tokio::test]
    async fn test_image_placeholder() {
        let avatar = render(r#"<q-avatar rounded><img src="a.png"></q-avatar>"#).await;
        assert_eq!(avatar.props.corner_radius, Some(4.0));
        let image = avatar.child(0).unwrap();
        assert_eq!(image.kind, NodeKind::Rectangle);
        assert_eq!(image.name(), "image-placeholder");
        assert_eq!(image.props.width, Some(32.0));
    }

    #[tokio::test]
    async fn test_icon_attribute() {
        let avatar = render(r#"<q-avatar icon="person" size="50px" />"#).await;
        let icon = avatar.child(0).unwrap();
        assert_eq!(icon.name(), "q-icon");
        assert_eq!(icon.props.width, Some(30.0));
    }
}
