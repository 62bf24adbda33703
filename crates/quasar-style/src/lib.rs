//! Styling for Quasar templates.
//!
//! Holds the named color palette, the utility class table, the inline style
//! parser, the style resolver and the component classifier.

pub mod classes;
pub mod classify;
pub mod color;
pub mod inline;
pub mod palette;
pub mod resolve;
pub mod style;

pub use classes::{class_style, classes_style};
pub use classify::{classify, Category, ComponentType};
pub use color::{analyze_colors, contrast_text_color, parse_css_color, ColorAnalysis, NamedColor};
pub use inline::{parse_inline_style, parse_length};
pub use palette::{Color, Palette, PALETTE};
pub use resolve::{category_defaults, resolve_styles};
pub use style::{
    AxisAlign, CounterAlign, Dimension, LayoutDirection, ResolvedStyle, Shadow, Sides, TextAlign,
    TextCase, TextDecoration,
};
