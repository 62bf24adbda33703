//! Style resolution for one node.
//!
//! Layers, later ones override earlier ones field by field:
//!
//! 1. inherited text settings from the ancestor
//! 2. category defaults
//! 3. utility classes, in declaration order
//! 4. inline `style`
//!
//! Processor-specific overrides are applied later by the processor itself.

use crate::classes::classes_style;
use crate::classify::{classify, Category};
use crate::inline::parse_inline_style;
use crate::style::*;
use quasar_template::SemanticNode;

/// Defaults implied by the node's classification.
pub fn category_defaults(node: &SemanticNode) -> ResolvedStyle {
    let component = classify(&node.tag);
    let mut style = ResolvedStyle::default();

    match component.category {
        Category::Layout => {
            style.layout = Some(LayoutDirection::Vertical);
            style.hug_contents = Some(true);
        }
        Category::Html => match component.kind.as_str() {
            "strong" | "b" => style.font_weight = Some(700),
            "em" | "i" => style.italic = Some(true),
            "u" => style.text_decoration = Some(TextDecoration::Underline),
            "s" | "del" => style.text_decoration = Some(TextDecoration::Strikethrough),
            "h1" => heading(&mut style, 32.0),
            "h2" => heading(&mut style, 24.0),
            "h3" => heading(&mut style, 18.72),
            "h4" => heading(&mut style, 16.0),
            "h5" => heading(&mut style, 13.28),
            "h6" => heading(&mut style, 10.72),
            "small" => style.font_size = Some(12.0),
            _ => {}
        },
        _ => {}
    }

    style
}

fn heading(style: &mut ResolvedStyle, size: f64) {
    style.font_size = Some(size);
    style.font_weight = Some(700);
}

/// Resolve the style of `node`, given the style already resolved for its
/// nearest rendered ancestor.
pub fn resolve_styles(node: &SemanticNode, ancestor: Option<&ResolvedStyle>) -> ResolvedStyle {
    let mut style = ancestor.map(ResolvedStyle::inherited).unwrap_or_default();

    style.merge(&category_defaults(node));
    style.merge(&classes_style(node.classes()));
    if let Some(inline) = node.attr("style") {
        style.merge(&parse_inline_style(inline));
    }
    style.settle_gutter();

    tracing::trace!(tag = %node.tag, ?style, "resolved style");
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{Color, Palette};
    use pretty_assertions::assert_eq;
    use quasar_template::Attributes;

    fn node(tag: &str, attrs: &[(&str, &str)]) -> SemanticNode {
        let attributes: Attributes = attrs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        SemanticNode::element(tag, attributes, Default::default())
    }

    #[test]
    fn test_inline_wins_per_field() {
        let div = node("div", &[("class", "pad-md"), ("style", "padding-left: 4px")]);
        let style = resolve_styles(&div, None);
        assert_eq!(style.padding, Sides::new(16.0, 16.0, 16.0, 4.0));
    }

    #[test]
    fn test_classes_apply_in_order() {
        let div = node("div", &[("class", "q-pa-lg q-pa-xs text-h6 text-weight-bold")]);
        let style = resolve_styles(&div, None);
        assert_eq!(style.padding, Sides::all(4.0));
        assert_eq!(style.font_size, Some(16.0));
        assert_eq!(style.font_weight, Some(700));
    }

    #[test]
    fn test_layout_category_defaults() {
        let card = node("q-card", &[]);
        let style = resolve_styles(&card, None);
        assert_eq!(style.layout, Some(LayoutDirection::Vertical));
        assert_eq!(style.hug_contents, Some(true));

        let row = node("q-card-section", &[("class", "row")]);
        assert_eq!(
            resolve_styles(&row, None).layout,
            Some(LayoutDirection::Horizontal)
        );
    }

    #[test]
    fn test_ancestor_text_settings_are_inherited() {
        let parent = resolve_styles(&node("div", &[("class", "text-white bg-dark q-pa-md")]), None);
        let child = resolve_styles(&node("span", &[]), Some(&parent));
        assert_eq!(child.text_color, Some(Color::WHITE));
        assert_eq!(child.fill, None);
        assert!(child.padding.is_empty());

        let overridden = resolve_styles(&node("span", &[("style", "color: black")]), Some(&parent));
        assert_eq!(overridden.text_color, Some(Color::BLACK));
    }

    #[test]
    fn test_gutter_uses_stacking_axis() {
        let row = node("div", &[("class", "row q-gutter-x-sm q-gutter-y-lg")]);
        assert_eq!(resolve_styles(&row, None).item_spacing, Some(8.0));
        let column = node("div", &[("class", "column q-gutter-x-sm q-gutter-y-lg")]);
        assert_eq!(resolve_styles(&column, None).item_spacing, Some(24.0));
    }

    #[test]
    fn test_html_defaults() {
        assert_eq!(resolve_styles(&node("strong", &[]), None).font_weight, Some(700));
        assert_eq!(resolve_styles(&node("em", &[]), None).italic, Some(true));
        let h1 = resolve_styles(&node("h1", &[("class", "bg-primary")]), None);
        assert_eq!(h1.font_size, Some(32.0));
        assert_eq!(h1.fill, Palette::global().get("primary"));
    }
}
