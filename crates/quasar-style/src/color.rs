//! Color parsing and per-node color analysis.

use crate::palette::{Color, Palette};
use quasar_template::SemanticNode;

/// A palette entry picked for a node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedColor {
    /// The palette name that matched (`primary-3`, or `primary` for a tone
    /// that does not exist).
    pub name: String,
    pub color: Color,
}

impl NamedColor {
    /// Look up `name` in the global palette.
    pub fn lookup(name: &str) -> Option<Self> {
        Palette::global().resolve(name).map(|(name, color)| Self {
            name: name.to_string(),
            color,
        })
    }
}

/// The colors a node asks for. Unset fields mean the node did not name a
/// palette color for that role; picking a default is up to the processor.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorAnalysis {
    pub main_color: Option<NamedColor>,
    pub background_color: Option<NamedColor>,
    pub text_color: Option<NamedColor>,
    pub border_color: Option<NamedColor>,
}

impl ColorAnalysis {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Background to paint: an explicit background, else the main color.
    pub fn effective_background(&self) -> Option<&NamedColor> {
        self.background_color.as_ref().or(self.main_color.as_ref())
    }
}

/// Inspect the `color`, `text-color`, `background` and `border-color`
/// attributes plus `bg-*` and `text-*` classes. Attributes win over classes.
pub fn analyze_colors(node: &SemanticNode) -> ColorAnalysis {
    let attr = |name: &str| node.attr(name).and_then(NamedColor::lookup);

    let mut analysis = ColorAnalysis {
        main_color: attr("color"),
        background_color: attr("background").or_else(|| attr("bg-color")),
        text_color: attr("text-color"),
        border_color: attr("border-color"),
    };

    for class in node.classes() {
        if let Some(name) = class.strip_prefix("bg-") {
            if analysis.background_color.is_none() {
                analysis.background_color = NamedColor::lookup(name);
            }
        } else if let Some(name) = class.strip_prefix("text-") {
            if analysis.text_color.is_none() {
                analysis.text_color = NamedColor::lookup(name);
            }
        }
    }

    analysis
}

/// Text color readable on `background`: black above luminance 0.5, white at
/// or below it.
pub fn contrast_text_color(background: Color) -> Color {
    text_color_for_luminance(background.luminance())
}

/// The contrast rule on a precomputed luminance.
pub fn text_color_for_luminance(luminance: f64) -> Color {
    if luminance > 0.5 {
        Color::BLACK
    } else {
        Color::WHITE
    }
}

const NAMED_CSS_COLORS: &[(&str, Color)] = &[
    ("white", Color::WHITE),
    ("black", Color::BLACK),
    ("red", Color::rgb(1.0, 0.0, 0.0)),
    ("green", Color::rgb(0.0, 0.8, 0.0)),
    ("blue", Color::rgb(0.0, 0.0, 1.0)),
    ("yellow", Color::rgb(1.0, 1.0, 0.0)),
    ("gray", Color::grey(0.5)),
    ("grey", Color::grey(0.5)),
    ("purple", Color::rgb(0.5, 0.0, 0.5)),
    ("orange", Color::rgb(1.0, 0.65, 0.0)),
    ("transparent", Color::TRANSPARENT),
];

/// Parse a CSS color: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`, a
/// small named set, or `var(--q-<palette name>)`.
pub fn parse_css_color(value: &str) -> Option<Color> {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();

    if let Some(hex) = lower.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }

    if let Some(var) = lower
        .strip_prefix("var(--q-")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return Palette::global().get(var.trim());
    }

    NAMED_CSS_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, color)| *color)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .ok()
            .map(|v| f64::from(v) / 255.0)
    };
    let alpha = if expanded.len() == 8 { channel(6)? } else { 1.0 };
    Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 3 {
        return None;
    }

    let channel = |raw: &str| -> Option<f64> {
        match raw.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok().map(|v| v / 100.0),
            None => raw.parse::<f64>().ok().map(|v| v / 255.0),
        }
    };
    let alpha = match parts.get(3) {
        Some(raw) => match raw.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? / 100.0,
            None => raw.parse::<f64>().ok()?,
        },
        None => 1.0,
    };

    Some(Color::rgba(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha).clamped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quasar_template::Attributes;

    fn node(attrs: &[(&str, &str)]) -> SemanticNode {
        let mut map = Attributes::new();
        for (k, v) in attrs {
            map.insert((*k).to_string(), (*v).to_string());
        }
        SemanticNode::element("q-btn", map, Default::default())
    }

    #[test]
    fn test_exact_tone_is_kept() {
        let analysis = analyze_colors(&node(&[("color", "primary-3")]));
        let main = analysis.main_color.unwrap();
        assert_eq!(main.name, "primary-3");
        assert_eq!(Some(main.color), Palette::global().get("primary-3"));
    }

    #[test]
    fn test_invalid_tone_falls_back_to_base() {
        let analysis = analyze_colors(&node(&[("color", "primary-99")]));
        assert_eq!(analysis.main_color.unwrap().name, "primary");
    }

    #[test]
    fn test_unknown_color_is_unset() {
        let analysis = analyze_colors(&node(&[("color", "doesnotexist")]));
        assert_eq!(analysis.main_color, None);
        assert!(analysis.is_empty());
    }

    #[test]
    fn test_classes_fill_unset_roles() {
        let analysis = analyze_colors(&node(&[
            ("class", "bg-teal-2 text-white text-h6"),
            ("text-color", "black"),
        ]));
        assert_eq!(analysis.background_color.unwrap().name, "teal-2");
        assert_eq!(analysis.text_color.unwrap().name, "black");
    }

    #[test]
    fn test_contrast_boundary() {
        assert_eq!(text_color_for_luminance(0.5), Color::WHITE);
        assert_eq!(text_color_for_luminance(0.51), Color::BLACK);
        assert_eq!(text_color_for_luminance(0.49), Color::WHITE);

        assert_eq!(contrast_text_color(Color::grey(0.5)), Color::WHITE);
        assert_eq!(contrast_text_color(Color::grey(0.51)), Color::BLACK);
        assert_eq!(contrast_text_color(Color::grey(0.49)), Color::WHITE);
    }

    #[test]
    fn test_parse_css_colors() {
        assert_eq!(parse_css_color("#fff"), Some(Color::WHITE));
        assert_eq!(parse_css_color("#FF0000"), Some(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(parse_css_color("#00000000"), Some(Color::TRANSPARENT));
        assert_eq!(parse_css_color("rgb(255, 0, 0)"), Some(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(
            parse_css_color("rgba(0, 0, 0, 0.5)"),
            Some(Color::rgba(0.0, 0.0, 0.0, 0.5))
        );
        assert_eq!(parse_css_color("Orange"), Some(Color::rgb(1.0, 0.65, 0.0)));
        assert_eq!(parse_css_color("var(--q-primary)"), Palette::global().get("primary"));
        assert_eq!(parse_css_color("#12"), None);
        assert_eq!(parse_css_color("hsl(0, 0%, 0%)"), None);
    }
}
