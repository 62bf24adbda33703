//! The resolved style record.

use crate::palette::Color;

/// Auto-layout stacking direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum LayoutDirection {
    Horizontal,
    Vertical,
}

/// Alignment along the stacking axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AxisAlign {
    Min,
    Center,
    Max,
    SpaceBetween,
}

/// Alignment across the stacking axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CounterAlign {
    Min,
    Center,
    Max,
    Baseline,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TextCase {
    Upper,
    Lower,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TextDecoration {
    Underline,
    Strikethrough,
}

/// A width or height.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dimension {
    /// Fixed size in pixels.
    Px(f64),
    /// `100%`: stretch along the parent's axis when the parent lays out its
    /// children automatically.
    Fill,
}

/// A drop shadow.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub radius: f64,
    pub color: Color,
}

impl Shadow {
    /// Quasar elevation `level`; negative levels cast upward.
    pub fn elevation(level: i32) -> Self {
        let depth = f64::from(level.abs());
        Self {
            offset_x: 0.0,
            offset_y: f64::from(level),
            radius: depth * 2.0,
            color: Color::BLACK.with_alpha(0.2),
        }
    }
}

/// Per-side lengths. Unset sides keep whatever an earlier layer chose.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sides {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

impl Sides {
    /// All four sides.
    pub fn all(v: f64) -> Self {
        Self::new(v, v, v, v)
    }

    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top: Some(top),
            right: Some(right),
            bottom: Some(bottom),
            left: Some(left),
        }
    }

    /// Left and right only.
    pub fn horizontal(v: f64) -> Self {
        Self {
            left: Some(v),
            right: Some(v),
            ..Default::default()
        }
    }

    /// Top and bottom only.
    pub fn vertical(v: f64) -> Self {
        Self {
            top: Some(v),
            bottom: Some(v),
            ..Default::default()
        }
    }

    /// CSS shorthand with one to four values.
    pub fn from_shorthand(values: &[f64]) -> Option<Self> {
        Some(match *values {
            [all] => Self::all(all),
            [y, x] => Self::new(y, x, y, x),
            [top, x, bottom] => Self::new(top, x, bottom, x),
            [top, right, bottom, left] => Self::new(top, right, bottom, left),
            _ => return None,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Sides set in `other` replace ours.
    pub fn merge(&mut self, other: &Sides) {
        overlay(&mut self.top, other.top);
        overlay(&mut self.right, other.right);
        overlay(&mut self.bottom, other.bottom);
        overlay(&mut self.left, other.left);
    }

    /// Sides with unset values read as zero: `(top, right, bottom, left)`.
    pub fn or_zero(&self) -> (f64, f64, f64, f64) {
        (
            self.top.unwrap_or(0.0),
            self.right.unwrap_or(0.0),
            self.bottom.unwrap_or(0.0),
            self.left.unwrap_or(0.0),
        )
    }
}

/// Flat style record for one node.
///
/// Every field is optional; `None` means "no layer said anything". Layers
/// are combined with [`ResolvedStyle::merge`], which overrides field by field.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedStyle {
    pub padding: Sides,
    pub margin: Sides,
    pub fill: Option<Color>,
    pub text_color: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_weight: Option<f64>,
    pub corner_radius: Option<f64>,
    pub font_size: Option<f64>,
    pub font_weight: Option<u16>,
    pub italic: Option<bool>,
    pub letter_spacing: Option<f64>,
    pub text_align: Option<TextAlign>,
    pub text_case: Option<TextCase>,
    pub text_decoration: Option<TextDecoration>,
    pub layout: Option<LayoutDirection>,
    pub primary_align: Option<AxisAlign>,
    pub counter_align: Option<CounterAlign>,
    pub align_self: Option<CounterAlign>,
    pub item_spacing: Option<f64>,
    /// Directional gutters; folded into `item_spacing` by the resolver.
    pub gutter_x: Option<f64>,
    pub gutter_y: Option<f64>,
    pub wrap: Option<bool>,
    pub hug_contents: Option<bool>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub clips_content: Option<bool>,
    pub shadow: Option<Shadow>,
}

fn overlay<T: Copy>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

impl ResolvedStyle {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a later layer on top of this one.
    pub fn merge(&mut self, other: &ResolvedStyle) {
        self.padding.merge(&other.padding);
        self.margin.merge(&other.margin);
        overlay(&mut self.fill, other.fill);
        overlay(&mut self.text_color, other.text_color);
        overlay(&mut self.stroke, other.stroke);
        overlay(&mut self.stroke_weight, other.stroke_weight);
        overlay(&mut self.corner_radius, other.corner_radius);
        overlay(&mut self.font_size, other.font_size);
        overlay(&mut self.font_weight, other.font_weight);
        overlay(&mut self.italic, other.italic);
        overlay(&mut self.letter_spacing, other.letter_spacing);
        overlay(&mut self.text_align, other.text_align);
        overlay(&mut self.text_case, other.text_case);
        overlay(&mut self.text_decoration, other.text_decoration);
        overlay(&mut self.layout, other.layout);
        overlay(&mut self.primary_align, other.primary_align);
        overlay(&mut self.counter_align, other.counter_align);
        overlay(&mut self.align_self, other.align_self);
        overlay(&mut self.item_spacing, other.item_spacing);
        overlay(&mut self.gutter_x, other.gutter_x);
        overlay(&mut self.gutter_y, other.gutter_y);
        overlay(&mut self.wrap, other.wrap);
        overlay(&mut self.hug_contents, other.hug_contents);
        overlay(&mut self.width, other.width);
        overlay(&mut self.height, other.height);
        overlay(&mut self.opacity, other.opacity);
        overlay(&mut self.visible, other.visible);
        overlay(&mut self.clips_content, other.clips_content);
        overlay(&mut self.shadow, other.shadow);
    }

    /// Builder form of [`Self::merge`].
    pub fn merged(mut self, other: &ResolvedStyle) -> Self {
        self.merge(other);
        self
    }

    /// The fields a child inherits: text color, font and text settings.
    pub fn inherited(&self) -> ResolvedStyle {
        ResolvedStyle {
            text_color: self.text_color,
            font_size: self.font_size,
            font_weight: self.font_weight,
            italic: self.italic,
            letter_spacing: self.letter_spacing,
            text_align: self.text_align,
            text_case: self.text_case,
            ..Default::default()
        }
    }

    /// Replace `item_spacing` with the directional gutter matching the
    /// stacking direction. The other axis is dropped.
    pub fn settle_gutter(&mut self) {
        let gutter = match self.layout {
            Some(LayoutDirection::Horizontal) => self.gutter_x,
            _ => self.gutter_y,
        };
        overlay(&mut self.item_spacing, gutter);
        self.gutter_x = None;
        self.gutter_y = None;
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
