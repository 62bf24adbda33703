//! Font fallback chains and text creation.

use crate::error::{ResourceUnavailableError, TargetError};
use crate::target::{set_properties, FontName, NodeId, RenderProperty, RenderTarget, VectorShape};
use quasar_style::{Color, ResolvedStyle, TextAlign, TextCase, TextDecoration};

/// Default body font size.
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

pub const ICON_FAMILIES: [&str; 3] = [
    "Material Icons",
    "Material Icons Outlined",
    "Material Symbols Outlined",
];

/// Style name for a weight and slant, e.g. `Medium`, `Bold Italic`.
pub fn font_style_name(weight: u16, italic: bool) -> String {
    let base = match weight {
        0..=149 => "Thin",
        150..=349 => "Light",
        350..=449 => "Regular",
        450..=549 => "Medium",
        550..=649 => "SemiBold",
        650..=799 => "Bold",
        _ => "Black",
    };
    match (base, italic) {
        ("Regular", true) => "Italic".to_string(),
        (base, true) => format!("{} Italic", base),
        (base, false) => base.to_string(),
    }
}

/// Candidates for a text font, most specific first, without duplicates.
pub fn text_font_chain(requested: &FontName) -> Vec<FontName> {
    let candidates = [
        requested.clone(),
        FontName::new("Roboto", requested.style.clone()),
        FontName::new("Inter", requested.style.clone()),
        FontName::new("Roboto", "Regular"),
        FontName::new("Inter", "Regular"),
    ];
    let mut chain: Vec<FontName> = Vec::with_capacity(candidates.len());
    for font in candidates {
        if !chain.contains(&font) {
            chain.push(font);
        }
    }
    chain
}

pub fn icon_font_chain() -> Vec<FontName> {
    ICON_FAMILIES
        .iter()
        .map(|family| FontName::new(*family, "Regular"))
        .collect()
}

/// Load the first available font of `chain`.
pub async fn load_first(
    target: &mut dyn RenderTarget,
    chain: &[FontName],
    resource: &'static str,
) -> Result<FontName, ResourceUnavailableError> {
    for font in chain {
        if target.load_font(font).await {
            return Ok(font.clone());
        }
        tracing::debug!(%font, "font unavailable, trying next");
    }
    Err(ResourceUnavailableError {
        resource,
        tried: chain
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Text settings for one text node.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub family: String,
    pub size: f64,
    pub weight: u16,
    pub italic: bool,
    pub color: Option<Color>,
    pub letter_spacing: Option<f64>,
    pub align: Option<TextAlign>,
    pub case: Option<TextCase>,
    pub decoration: Option<TextDecoration>,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            family: "Roboto".to_string(),
            size: DEFAULT_FONT_SIZE,
            weight: 400,
            italic: false,
            color: None,
            letter_spacing: None,
            align: None,
            case: None,
            decoration: None,
        }
    }
}

impl TextOptions {
    /// Options taken from a resolved style, defaults for unset fields.
    pub fn from_style(style: &ResolvedStyle) -> Self {
        let defaults = Self::default();
        Self {
            size: style.font_size.unwrap_or(defaults.size),
            weight: style.font_weight.unwrap_or(defaults.weight),
            italic: style.italic.unwrap_or(false),
            color: style.text_color,
            letter_spacing: style.letter_spacing,
            align: style.text_align,
            case: style.text_case,
            decoration: style.text_decoration,
            ..defaults
        }
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    pub fn color(mut self, color: impl Into<Option<Color>>) -> Self {
        self.color = color.into();
        self
    }

    pub fn font(&self) -> FontName {
        FontName::new(self.family.clone(), font_style_name(self.weight, self.italic))
    }
}

/// Create a text node with the first loadable font of the fallback chain.
///
/// When no font loads, a grey placeholder rectangle is created instead and
/// returned; the caller attaches it like any other node.
pub async fn create_text(
    target: &mut dyn RenderTarget,
    content: &str,
    options: &TextOptions,
) -> Result<NodeId, TargetError> {
    let chain = text_font_chain(&options.font());
    match load_first(target, &chain, "text font").await {
        Ok(font) => {
            let text = target.create_text();
            let mut properties = vec![
                RenderProperty::Name(content.to_string()),
                RenderProperty::Font(font),
                RenderProperty::Characters(content.to_string()),
                RenderProperty::FontSize(options.size),
            ];
            properties.extend(options.color.map(|c| RenderProperty::Fill(Some(c))));
            properties.extend(options.letter_spacing.map(RenderProperty::LetterSpacing));
            properties.extend(options.align.map(RenderProperty::TextAlign));
            properties.extend(options.case.map(RenderProperty::TextCase));
            properties.extend(options.decoration.map(RenderProperty::TextDecoration));
            set_properties(target, text, properties);
            Ok(text)
        }
        Err(err) => {
            tracing::warn!(%err, content, "using placeholder for text");
            let placeholder = target.create_vector(VectorShape::Rectangle);
            let width = (content.chars().count() as f64 * options.size * 0.6).max(options.size);
            target.set_property(placeholder, RenderProperty::Name("text-placeholder".into()))?;
            target.set_property(
                placeholder,
                RenderProperty::Resize {
                    width,
                    height: options.size * 1.2,
                },
            )?;
            target.set_property(placeholder, RenderProperty::Fill(Some(Color::grey(0.85))))?;
            Ok(placeholder)
        }
    }
}
