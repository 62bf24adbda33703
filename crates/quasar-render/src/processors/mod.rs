//! Built-in component processors.
//!
//! Every processor applies the resolved style it is handed first, then its
//! own overrides, so component defaults can be changed by classes but the
//! parts that define a component's look always win.

mod avatar;
mod button;
mod generic;
mod icon;
mod list;

pub use avatar::AvatarProcessor;
pub use button::ButtonProcessor;
pub use generic::GenericProcessor;
pub use icon::{glyph_for, IconLibrary, IconProcessor};
pub use list::{ItemLabelProcessor, ItemProcessor, ItemSectionProcessor, ListProcessor};

use crate::error::ProcessorError;
use crate::fonts::{self, TextOptions};
use crate::registry::ProcessContext;
use crate::settings::Density;
use crate::target::{set_properties, NodeId, RenderProperty, RenderTarget};
use quasar_style::{Color, Dimension, Palette, ResolvedStyle};
use quasar_template::{Attributes, SemanticNode};

/// Tags whose processors place their own children. The materializer does
/// not recurse into them.
pub const SELF_MANAGING: &[&str] = &[
    "q-btn",
    "q-icon",
    "q-avatar",
    "q-list",
    "q-item",
    "q-item-section",
    "q-item-label",
];

pub fn is_self_managing(tag: &str) -> bool {
    SELF_MANAGING.contains(&tag)
}

/// Quasar size tokens shared by several components.
pub(crate) fn size_token<T: Copy>(value: &str, table: &[(&str, T)]) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, v)| *v)
}

/// Palette color named by attribute `name`.
pub(crate) fn palette_attr(node: &SemanticNode, name: &str) -> Option<Color> {
    node.attr(name)
        .and_then(|value| Palette::global().resolve(value))
        .map(|(_, color)| color)
}

/// Frame-level properties of `style`. Text fields and `100%` sizes are left
/// to the caller.
pub fn style_properties(style: &ResolvedStyle) -> Vec<RenderProperty> {
    let mut props = Vec::new();
    props.extend(style.layout.map(RenderProperty::Layout));
    props.extend(style.hug_contents.map(RenderProperty::HugContents));
    if !style.padding.is_empty() {
        let (top, right, bottom, left) = style.padding.or_zero();
        props.push(RenderProperty::Padding {
            top,
            right,
            bottom,
            left,
        });
    }
    props.extend(style.item_spacing.map(RenderProperty::ItemSpacing));
    props.extend(style.primary_align.map(RenderProperty::PrimaryAlign));
    props.extend(style.counter_align.map(RenderProperty::CounterAlign));
    props.extend(style.align_self.map(RenderProperty::AlignSelf));
    props.extend(style.wrap.map(RenderProperty::Wrap));
    props.extend(style.fill.map(|c| RenderProperty::Fill(Some(c))));
    props.extend(style.stroke.map(RenderProperty::Stroke));
    props.extend(style.stroke_weight.map(RenderProperty::StrokeWeight));
    props.extend(style.corner_radius.map(RenderProperty::CornerRadius));
    props.extend(style.opacity.map(RenderProperty::Opacity));
    props.extend(style.visible.map(RenderProperty::Visible));
    props.extend(style.clips_content.map(RenderProperty::ClipsContent));
    props.extend(style.shadow.map(RenderProperty::Shadow));
    if let Some(Dimension::Px(w)) = style.width {
        props.push(RenderProperty::Width(w));
    }
    if let Some(Dimension::Px(h)) = style.height {
        props.push(RenderProperty::Height(h));
    }
    props
}

pub fn apply_frame_style(target: &mut dyn RenderTarget, node: NodeId, style: &ResolvedStyle) {
    set_properties(target, node, style_properties(style));
}

/// Vertical and horizontal padding for a component with a dense form.
pub(crate) fn density_padding(
    density: Density,
    dense: bool,
    normal: (f64, f64),
    compact: (f64, f64),
) -> (f64, f64) {
    if dense || density == Density::Compact {
        compact
    } else {
        (normal.0 + density.vertical_bonus(), normal.1)
    }
}

pub(crate) fn padding(vertical: f64, horizontal: f64) -> RenderProperty {
    RenderProperty::Padding {
        top: vertical,
        right: horizontal,
        bottom: vertical,
        left: horizontal,
    }
}

/// A named frame with `properties` set.
pub(crate) fn container(
    cx: &mut ProcessContext<'_>,
    name: &str,
    properties: impl IntoIterator<Item = RenderProperty>,
) -> NodeId {
    let frame = cx.target.create_container();
    set_properties(
        cx.target,
        frame,
        std::iter::once(RenderProperty::Name(name.to_string())).chain(properties),
    );
    frame
}

pub(crate) fn append(
    cx: &mut ProcessContext<'_>,
    tag: &str,
    parent: NodeId,
    child: NodeId,
) -> Result<(), ProcessorError> {
    cx.target
        .append_child(parent, child)
        .map_err(|err| ProcessorError::wrap(tag, err))
}

pub(crate) async fn text(
    cx: &mut ProcessContext<'_>,
    tag: &str,
    content: &str,
    options: &TextOptions,
) -> Result<NodeId, ProcessorError> {
    fonts::create_text(cx.target, content, options)
        .await
        .map_err(|err| ProcessorError::wrap(tag, err))
}

/// A synthetic element for rendering through the registry.
pub(crate) fn synthetic(tag: &str, attrs: &[(&str, &str)], like: &SemanticNode) -> SemanticNode {
    let attributes: Attributes = attrs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    SemanticNode::element(tag, attributes, like.span)
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quasar_style::{LayoutDirection, Sides};

    #[test]
    fn test_style_properties_skip_unset_fields() {
        let style = ResolvedStyle {
            layout: Some(LayoutDirection::Horizontal),
            padding: Sides::horizontal(8.0),
            width: Some(Dimension::Fill),
            height: Some(Dimension::Px(40.0)),
            ..Default::default()
        };
        assert_eq!(
            style_properties(&style),
            vec![
                RenderProperty::Layout(LayoutDirection::Horizontal),
                RenderProperty::Padding {
                    top: 0.0,
                    right: 8.0,
                    bottom: 0.0,
                    left: 8.0
                },
                RenderProperty::Height(40.0),
            ]
        );
    }

    #[test]
    fn test_density_padding() {
        assert_eq!(density_padding(Density::Default, false, (8.0, 16.0), (4.0, 8.0)), (8.0, 16.0));
        assert_eq!(density_padding(Density::Default, true, (8.0, 16.0), (4.0, 8.0)), (4.0, 8.0));
        assert_eq!(density_padding(Density::Compact, false, (8.0, 16.0), (4.0, 8.0)), (4.0, 8.0));
        assert_eq!(
            density_padding(Density::Comfortable, false, (8.0, 16.0), (4.0, 8.0)),
            (12.0, 16.0)
        );
    }

    #[test]
    fn test_self_managing_list() {
        assert!(is_self_managing("q-btn"));
        assert!(is_self_managing("q-item-label"));
        assert!(!is_self_managing("q-card"));
    }
}
