//! Inline `style="..."` declarations.

use crate::color::parse_css_color;
use crate::style::*;

/// Parse a length: bare number, `px`, or `rem`/`em` at 16px each.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    let (number, scale) = if let Some(n) = value.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("rem") {
        (n, 16.0)
    } else if let Some(n) = value.strip_suffix("em") {
        (n, 16.0)
    } else {
        (value.as_str(), 1.0)
    };
    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n * scale)
}

fn parse_font_size(value: &str) -> Option<f64> {
    parse_length(value).or(match value.trim() {
        "small" => Some(12.0),
        "medium" => Some(14.0),
        "large" => Some(16.0),
        "x-large" => Some(20.0),
        "xx-large" => Some(24.0),
        _ => None,
    })
}

fn parse_font_weight(value: &str) -> Option<u16> {
    match value.trim() {
        "normal" => Some(400),
        "bold" => Some(700),
        "lighter" => Some(300),
        "bolder" => Some(900),
        n => n.parse().ok().filter(|w| (1..=1000).contains(w)),
    }
}

fn parse_dimension(value: &str) -> Option<Dimension> {
    let value = value.trim();
    if value == "100%" {
        return Some(Dimension::Fill);
    }
    if value.ends_with('%') {
        tracing::warn!(value, "percentage size other than 100% has no equivalent, ignoring");
        return None;
    }
    parse_length(value).map(Dimension::Px)
}

/// Split a declaration value on whitespace outside parentheses, so
/// `2px solid rgb(0, 0, 255)` yields three parts.
pub fn split_value(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&value[s..i]);
                }
                continue;
            }
            _ => {}
        }
        start.get_or_insert(i);
    }
    if let Some(s) = start {
        parts.push(&value[s..]);
    }
    parts
}

fn parse_sides(value: &str) -> Option<Sides> {
    let lengths = split_value(value)
        .into_iter()
        .map(parse_length)
        .collect::<Option<Vec<_>>>()?;
    Sides::from_shorthand(&lengths)
}

fn parse_justify(value: &str) -> Option<AxisAlign> {
    Some(match value {
        "flex-start" | "start" | "left" => AxisAlign::Min,
        "center" => AxisAlign::Center,
        "flex-end" | "end" | "right" => AxisAlign::Max,
        "space-between" | "space-around" | "space-evenly" => AxisAlign::SpaceBetween,
        _ => return None,
    })
}

fn parse_align(value: &str) -> Option<CounterAlign> {
    Some(match value {
        "flex-start" | "start" => CounterAlign::Min,
        "center" => CounterAlign::Center,
        "flex-end" | "end" => CounterAlign::Max,
        "baseline" => CounterAlign::Baseline,
        "stretch" => CounterAlign::Stretch,
        _ => return None,
    })
}

/// Parse `key: value; ...` into a style record. Declarations that cannot be
/// read are skipped.
pub fn parse_inline_style(source: &str) -> ResolvedStyle {
    let mut style = ResolvedStyle::default();

    for declaration in source.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim().trim_end_matches("!important").trim();
        if property.is_empty() || value.is_empty() {
            continue;
        }

        if !apply_declaration(&mut style, &property, value) {
            tracing::debug!(property = %property, value, "skipping inline declaration");
        }
    }

    style
}

fn apply_declaration(style: &mut ResolvedStyle, property: &str, value: &str) -> bool {
    let side = |v: &str| parse_length(v);
    let applied = match property {
        "color" => parse_css_color(value).map(|c| style.text_color = Some(c)),
        "background" | "background-color" => parse_css_color(value).map(|c| style.fill = Some(c)),
        "border-color" => parse_css_color(value).map(|c| style.stroke = Some(c)),
        "border-width" => side(value).map(|w| style.stroke_weight = Some(w)),
        "border" => parse_border(style, value),
        "border-radius" => side(value).map(|r| style.corner_radius = Some(r)),

        "padding" => parse_sides(value).map(|s| style.padding.merge(&s)),
        "padding-top" => side(value).map(|v| style.padding.top = Some(v)),
        "padding-right" => side(value).map(|v| style.padding.right = Some(v)),
        "padding-bottom" => side(value).map(|v| style.padding.bottom = Some(v)),
        "padding-left" => side(value).map(|v| style.padding.left = Some(v)),
        "margin" => parse_sides(value).map(|s| style.margin.merge(&s)),
        "margin-top" => side(value).map(|v| style.margin.top = Some(v)),
        "margin-right" => side(value).map(|v| style.margin.right = Some(v)),
        "margin-bottom" => side(value).map(|v| style.margin.bottom = Some(v)),
        "margin-left" => side(value).map(|v| style.margin.left = Some(v)),

        "font-size" => parse_font_size(value).map(|v| style.font_size = Some(v)),
        "font-weight" => parse_font_weight(value).map(|v| style.font_weight = Some(v)),
        "font-style" => Some(style.italic = Some(matches!(value, "italic" | "oblique"))),
        "letter-spacing" => side(value).map(|v| style.letter_spacing = Some(v)),
        "text-align" => match value {
            "left" | "start" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" | "end" => Some(TextAlign::Right),
            "justify" => Some(TextAlign::Justified),
            _ => None,
        }
        .map(|a| style.text_align = Some(a)),
        "text-transform" => match value {
            "uppercase" => Some(TextCase::Upper),
            "lowercase" => Some(TextCase::Lower),
            "capitalize" => Some(TextCase::Title),
            _ => None,
        }
        .map(|c| style.text_case = Some(c)),
        "text-decoration" | "text-decoration-line" => match value {
            "underline" => Some(TextDecoration::Underline),
            "line-through" => Some(TextDecoration::Strikethrough),
            _ => None,
        }
        .map(|d| style.text_decoration = Some(d)),

        "display" => match value {
            "none" => Some(style.visible = Some(false)),
            "flex" | "inline-flex" => Some(style.layout = style.layout.or(Some(LayoutDirection::Horizontal))),
            _ => None,
        },
        "flex-direction" => match value {
            "row" | "row-reverse" => Some(LayoutDirection::Horizontal),
            "column" | "column-reverse" => Some(LayoutDirection::Vertical),
            _ => None,
        }
        .map(|d| style.layout = Some(d)),
        "flex-wrap" => Some(style.wrap = Some(value != "nowrap")),
        "justify-content" => parse_justify(value).map(|a| style.primary_align = Some(a)),
        "align-items" => parse_align(value).map(|a| style.counter_align = Some(a)),
        "align-self" => parse_align(value).map(|a| style.align_self = Some(a)),
        "gap" | "row-gap" | "column-gap" => side(value).map(|v| style.item_spacing = Some(v)),

        "width" => parse_dimension(value).map(|d| style.width = Some(d)),
        "height" => parse_dimension(value).map(|d| style.height = Some(d)),
        "opacity" => value
            .parse::<f64>()
            .ok()
            .map(|o| style.opacity = Some(o.clamp(0.0, 1.0))),
        "visibility" => Some(style.visible = Some(value != "hidden")),
        "overflow" => Some(style.clips_content = Some(value != "visible")),
        _ => None,
    };
    applied.is_some()
}

/// `border: 1px solid #ccc`
fn parse_border(style: &mut ResolvedStyle, value: &str) -> Option<()> {
    if value == "none" || value == "0" {
        style.stroke_weight = Some(0.0);
        return Some(());
    }
    let mut matched = false;
    for part in split_value(value) {
        if let Some(width) = parse_length(part) {
            style.stroke_weight = Some(width);
            matched = true;
        } else if let Some(color) = parse_css_color(part) {
            style.stroke = Some(color);
            matched = true;
        }
    }
    matched.then_some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lengths() {
        assert_eq!(parse_length("12"), Some(12.0));
        assert_eq!(parse_length("12px"), Some(12.0));
        assert_eq!(parse_length("1.5rem"), Some(24.0));
        assert_eq!(parse_length("2em"), Some(32.0));
        assert_eq!(parse_length("auto"), None);
    }

    #[test]
    fn test_spacing_declarations() {
        let style = parse_inline_style("padding: 8px 16px; padding-left: 4px; margin-top: 2rem");
        assert_eq!(style.padding, Sides::new(8.0, 16.0, 8.0, 4.0));
        assert_eq!(style.margin.top, Some(32.0));
        assert_eq!(style.margin.left, None);
    }

    #[test]
    fn test_text_declarations() {
        let style = parse_inline_style(
            "color: #ff0000; font-size: large; font-weight: bold; text-align: justify; text-transform: uppercase",
        );
        assert_eq!(style.text_color, Some(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(style.font_size, Some(16.0));
        assert_eq!(style.font_weight, Some(700));
        assert_eq!(style.text_align, Some(TextAlign::Justified));
        assert_eq!(style.text_case, Some(TextCase::Upper));
    }

    #[test]
    fn test_unparseable_declarations_are_ignored() {
        let style = parse_inline_style("color: nonsense; font-size: huge; ; junk; width: 50%; padding: 4px");
        assert_eq!(style.text_color, None);
        assert_eq!(style.font_size, None);
        assert_eq!(style.width, None);
        assert_eq!(style.padding, Sides::all(4.0));
    }

    #[test]
    fn test_layout_and_sizes() {
        let style = parse_inline_style(
            "display: flex; flex-direction: column; gap: 12px; justify-content: space-between; width: 100%; height: 40px",
        );
        assert_eq!(style.layout, Some(LayoutDirection::Vertical));
        assert_eq!(style.item_spacing, Some(12.0));
        assert_eq!(style.primary_align, Some(AxisAlign::SpaceBetween));
        assert_eq!(style.width, Some(Dimension::Fill));
        assert_eq!(style.height, Some(Dimension::Px(40.0)));
    }

    #[test]
    fn test_border_shorthand() {
        let style = parse_inline_style("border: 2px solid rgb(0, 0, 255); border-radius: 8px");
        assert_eq!(style.stroke_weight, Some(2.0));
        assert_eq!(style.stroke, Some(Color::rgb(0.0, 0.0, 1.0)));
        assert_eq!(style.corner_radius, Some(8.0));

        let style = parse_inline_style("border: rgba(255, 0, 0, 0.5) 3px dashed");
        assert_eq!(style.stroke_weight, Some(3.0));
        assert!(style.stroke.is_some());
    }

    #[test]
    fn test_split_value_keeps_functions_whole() {
        assert_eq!(
            split_value("  2px solid   rgb(0, 0, 255) "),
            vec!["2px", "solid", "rgb(0, 0, 255)"]
        );
        assert_eq!(split_value("calc(1px + (2px * 3)) 4px"), vec!["calc(1px + (2px * 3))", "4px"]);
        assert!(split_value("   ").is_empty());
    }
}
