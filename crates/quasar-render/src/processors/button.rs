use super::{
    apply_frame_style, append, container, density_padding, padding, size_token, synthetic, text,
};
use crate::error::ProcessorError;
use crate::fonts::TextOptions;
use crate::registry::{ProcessContext, Processor};
use crate::target::{set_properties, NodeId, RenderProperty};
use async_trait::async_trait;
use quasar_style::{
    analyze_colors, contrast_text_color, AxisAlign, Color, CounterAlign, LayoutDirection,
    ResolvedStyle, TextCase,
};
use quasar_template::SemanticNode;

/// `(vertical padding, horizontal padding, label font size)` per size token.
const SIZES: [(&str, (f64, f64, f64)); 5] = [
    ("xs", (4.0, 8.0, 12.0)),
    ("sm", (6.0, 10.0, 13.0)),
    ("md", (8.0, 16.0, 14.0)),
    ("lg", (12.0, 20.0, 16.0)),
    ("xl", (16.0, 24.0, 18.0)),
];

const DEFAULT_SIZE: (f64, f64, f64) = (8.0, 16.0, 14.0);
const DENSE_PADDING: (f64, f64) = (4.0, 8.0);
const ROUND_RADIUS: f64 = 999.0;

/// Colors picked for one button.
struct ButtonColors {
    fill: Option<Color>,
    stroke: Option<Color>,
    text: Option<Color>,
}

fn button_colors(node: &SemanticNode, style: &ResolvedStyle) -> ButtonColors {
    let analysis = analyze_colors(node);
    let main = analysis.effective_background().map(|c| c.color);
    let explicit_text = analysis.text_color.as_ref().map(|c| c.color);

    if node.flag("flat") || node.flag("outline") {
        return ButtonColors {
            fill: None,
            stroke: main.filter(|_| node.flag("outline")),
            text: explicit_text.or(main).or(style.text_color),
        };
    }
    ButtonColors {
        fill: main,
        stroke: None,
        text: explicit_text
            .or_else(|| main.map(contrast_text_color))
            .or(style.text_color),
    }
}

/// `q-btn`: frame > wrapper > content, holding an optional leading icon,
/// the label (or the rendered children) and an optional trailing icon.
pub struct ButtonProcessor;

#[async_trait]
impl Processor for ButtonProcessor {
    async fn process(
        &self,
        node: &SemanticNode,
        style: &ResolvedStyle,
        cx: &mut ProcessContext<'_>,
    ) -> Result<NodeId, ProcessorError> {
        let tag = node.tag.as_str();
        let dense = node.flag("dense");
        let (vertical, horizontal, font_size) = node
            .attr("size")
            .and_then(|size| size_token(size, &SIZES))
            .unwrap_or(DEFAULT_SIZE);
        let (vertical, horizontal) = density_padding(
            cx.settings.density,
            dense,
            (vertical, horizontal),
            DENSE_PADDING,
        );

        let colors = button_colors(node, style);
        let radius = if node.flag("round") {
            ROUND_RADIUS
        } else if node.flag("rounded") {
            28.0
        } else if node.flag("square") {
            0.0
        } else {
            4.0
        };

        let frame = container(cx, "q-btn", []);
        apply_frame_style(cx.target, frame, style);
        let mut frame_props = vec![
            RenderProperty::Layout(LayoutDirection::Horizontal),
            RenderProperty::HugContents(true),
            RenderProperty::PrimaryAlign(AxisAlign::Center),
            RenderProperty::CounterAlign(CounterAlign::Center),
            RenderProperty::CornerRadius(radius),
        ];
        if colors.fill.is_some() || node.flag("flat") || node.flag("outline") {
            frame_props.push(RenderProperty::Fill(colors.fill));
        }
        if let Some(stroke) = colors.stroke {
            frame_props.extend([RenderProperty::Stroke(stroke), RenderProperty::StrokeWeight(1.0)]);
        }
        if node.flag("full-width") {
            frame_props.push(RenderProperty::Stretch(true));
        }
        set_properties(cx.target, frame, frame_props);
        if colors.fill.is_some() || colors.stroke.is_some() {
            cx.mark_colored(frame);
        }

        let wrapper = container(
            cx,
            "q-btn__wrapper",
            [
                RenderProperty::Layout(LayoutDirection::Horizontal),
                RenderProperty::HugContents(true),
                RenderProperty::PrimaryAlign(AxisAlign::Center),
                RenderProperty::CounterAlign(CounterAlign::Center),
                RenderProperty::Fill(None),
                padding(vertical, horizontal),
            ],
        );
        append(cx, tag, frame, wrapper)?;

        let content = container(
            cx,
            "q-btn__content",
            [
                RenderProperty::Layout(LayoutDirection::Horizontal),
                RenderProperty::HugContents(true),
                RenderProperty::CounterAlign(CounterAlign::Center),
                RenderProperty::Fill(None),
                RenderProperty::ItemSpacing(8.0),
            ],
        );
        append(cx, tag, wrapper, content)?;

        // Children inherit the label color.
        let inner = ResolvedStyle {
            text_color: colors.text,
            ..style.inherited()
        };
        let text_options = TextOptions::from_style(style)
            .size(font_size)
            .weight(500)
            .color(colors.text);
        let text_options = TextOptions {
            case: if node.flag("no-caps") {
                style.text_case
            } else {
                Some(TextCase::Upper)
            },
            ..text_options
        };

        let mut placed = 0;
        if let Some(label) = node.attr("label").filter(|l| !l.is_empty()) {
            let label = text(cx, tag, label, &text_options).await?;
            append(cx, tag, content, label)?;
            placed += 1;
        } else {
            placed += place_children(node, &inner, &text_options, content, cx).await?;
        }

        let icon_size = if dense { "sm" } else { node.attr("size").unwrap_or("md") };
        if let Some(name) = node.attr("icon") {
            let icon = synthetic("q-icon", &[("name", name), ("size", icon_size)], node);
            let icon = cx.render_nested(&icon, &inner).await?;
            cx.target
                .insert_child(content, 0, icon)
                .map_err(|err| ProcessorError::wrap(tag, err))?;
            placed += 1;
        }
        if let Some(name) = node.attr("icon-right") {
            let icon = synthetic("q-icon", &[("name", name), ("size", icon_size)], node);
            let icon = cx.render_nested(&icon, &inner).await?;
            append(cx, tag, content, icon)?;
            placed += 1;
        }

        if placed == 0 {
            let label = text(cx, tag, "Button", &text_options).await?;
            append(cx, tag, content, label)?;
        }
        Ok(frame)
    }
}

/// Render the button's own children into `content`. Returns how many nodes
/// were placed.
async fn place_children(
    node: &SemanticNode,
    inner: &ResolvedStyle,
    text_options: &TextOptions,
    content: NodeId,
    cx: &mut ProcessContext<'_>,
) -> Result<usize, ProcessorError> {
    let tag = node.tag.as_str();
    let mut placed = 0;
    for child in &node.children {
        if child.is_suppressed() {
            continue;
        }
        if child.is_text() {
            let value = child.text.as_deref().unwrap_or("").trim();
            if !value.is_empty() {
                let label = text(cx, tag, value, text_options).await?;
                append(cx, tag, content, label)?;
                placed += 1;
            }
            continue;
        }
        if child.tag == "div" || child.tag == "span" {
            // Wrapper markup: lift icons out, keep the remaining text.
            let mut icons = Vec::new();
            collect_icons(child, &mut icons);
            for icon in icons {
                let icon = cx.render_nested(icon, inner).await?;
                append(cx, tag, content, icon)?;
                placed += 1;
            }
            let value = text_without_icons(child);
            if !value.is_empty() {
                let label = text(cx, tag, &value, text_options).await?;
                append(cx, tag, content, label)?;
                placed += 1;
            }
            continue;
        }
        let rendered = cx.render_nested(child, inner).await?;
        append(cx, tag, content, rendered)?;
        placed += 1;
    }
    Ok(placed)
}

fn collect_icons<'a>(node: &'a SemanticNode, out: &mut Vec<&'a SemanticNode>) {
    for child in node.child_elements() {
        if child.tag == "q-icon" {
            out.push(child);
        } else {
            collect_icons(child, out);
        }
    }
}

fn text_without_icons(node: &SemanticNode) -> String {
    fn walk<'a>(node: &'a SemanticNode, out: &mut Vec<&'a str>) {
        for child in &node.children {
            if child.tag == "q-icon" {
                continue;
            }
            if let Some(text) = child.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                out.push(text);
            }
            walk(child, out);
        }
    }
    let mut parts = Vec::new();
    walk(node, &mut parts);
    parts.join(" ")
}
