//! The named color palette.
//!
//! Base colors are the Quasar brand colors, the Material colors and plain
//! white/black. Every base color gets fourteen tonal variants named
//! `<base>-1` .. `<base>-14`: five lighter, the base itself, one mid-tone and
//! seven darker.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::fmt;

/// An RGBA color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Create an opaque color.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color with alpha.
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// A neutral grey.
    pub const fn grey(level: f64) -> Self {
        Self::rgb(level, level, level)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Every channel clamped into `0.0..=1.0`.
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    /// Perceived brightness, `0.299r + 0.587g + 0.114b`.
    ///
    /// Rounded to nine decimals so a mid grey lands exactly on `0.5`.
    pub fn luminance(&self) -> f64 {
        let raw = 0.299 * self.r + 0.587 * self.g + 0.114 * self.b;
        (raw * 1e9).round() / 1e9
    }

    /// `#rrggbb`, with an alpha byte appended when not opaque.
    pub fn to_hex(&self) -> String {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                byte(self.r),
                byte(self.g),
                byte(self.b),
                byte(self.a)
            )
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Number of tonal variants generated per base color.
pub const TONES: u8 = 14;

const BASE_COLORS: &[(&str, Color)] = &[
    ("primary", Color::rgb(0.1, 0.5, 0.9)),
    ("secondary", Color::rgb(0.15, 0.65, 0.6)),
    ("accent", Color::rgb(0.61, 0.15, 0.69)),
    ("positive", Color::rgb(0.13, 0.73, 0.27)),
    ("negative", Color::rgb(0.76, 0.0, 0.08)),
    ("info", Color::rgb(0.19, 0.8, 0.93)),
    ("warning", Color::rgb(0.95, 0.75, 0.22)),
    ("dark", Color::grey(0.19)),
    ("light", Color::grey(0.95)),
    ("white", Color::WHITE),
    ("black", Color::BLACK),
    ("red", Color::rgb(0.957, 0.263, 0.212)),
    ("pink", Color::rgb(0.914, 0.118, 0.388)),
    ("purple", Color::rgb(0.612, 0.153, 0.69)),
    ("deep-purple", Color::rgb(0.404, 0.227, 0.718)),
    ("indigo", Color::rgb(0.247, 0.318, 0.71)),
    ("blue", Color::rgb(0.129, 0.588, 0.953)),
    ("light-blue", Color::rgb(0.012, 0.663, 0.957)),
    ("cyan", Color::rgb(0.0, 0.737, 0.831)),
    ("teal", Color::rgb(0.0, 0.588, 0.533)),
    ("green", Color::rgb(0.298, 0.686, 0.314)),
    ("light-green", Color::rgb(0.545, 0.765, 0.29)),
    ("lime", Color::rgb(0.804, 0.863, 0.224)),
    ("yellow", Color::rgb(1.0, 0.922, 0.231)),
    ("amber", Color::rgb(1.0, 0.757, 0.027)),
    ("orange", Color::rgb(1.0, 0.596, 0.0)),
    ("deep-orange", Color::rgb(1.0, 0.341, 0.133)),
    ("brown", Color::rgb(0.475, 0.333, 0.282)),
    ("grey", Color::grey(0.62)),
    ("blue-grey", Color::rgb(0.376, 0.49, 0.545)),
];

/// The tonal variant `tone` (1-based) of `base`.
///
/// Tones 1-5 blend toward white, 6 is the base, 7 is the base at 90% and
/// 8-14 darken from 90% down to 30%.
pub fn tonal_variant(base: Color, tone: u8) -> Color {
    let t = f64::from(tone);
    let blend = |c: f64| match tone {
        1..=5 => {
            let factor = 1.0 - 0.1 * (5.0 - t);
            let white = 0.9 - 0.1 * t;
            c * factor + white
        }
        6 => c,
        7 => c * 0.9,
        _ => c * (0.9 - 0.1 * (t - 8.0)),
    };
    Color::rgba(blend(base.r), blend(base.g), blend(base.b), base.a).clamped()
}

/// Read-only table of named colors.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: IndexMap<String, Color>,
}

/// The process-wide palette, built on first use.
pub static PALETTE: Lazy<Palette> = Lazy::new(Palette::build);

impl Palette {
    /// Build the full palette with tonal variants.
    pub fn build() -> Self {
        let mut colors = IndexMap::with_capacity(BASE_COLORS.len() * (TONES as usize + 1));
        for (name, base) in BASE_COLORS {
            colors.insert((*name).to_string(), *base);
            for tone in 1..=TONES {
                colors.insert(format!("{}-{}", name, tone), tonal_variant(*base, tone));
            }
        }
        Self { colors }
    }

    /// The shared palette.
    pub fn global() -> &'static Palette {
        &PALETTE
    }

    /// Exact lookup.
    pub fn get(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    /// Exact lookup, then the un-toned base of a `name-N` spelling.
    ///
    /// Returns the name that matched along with its color.
    pub fn resolve<'a>(&self, name: &'a str) -> Option<(&'a str, Color)> {
        let name = name.trim();
        if let Some(color) = self.get(name) {
            return Some((name, color));
        }
        let (base, tone) = name.rsplit_once('-')?;
        if tone.is_empty() || !tone.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.get(base).map(|color| (base, color))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.colors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Base color names, without tonal variants.
    pub fn base_names(&self) -> impl Iterator<Item = &'static str> {
        BASE_COLORS.iter().map(|(name, _)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_palette_has_fourteen_tones_per_base() {
        let palette = Palette::build();
        assert_eq!(palette.len(), BASE_COLORS.len() * 15);
        for tone in 1..=14 {
            assert!(palette.contains(&format!("teal-{}", tone)));
        }
        assert!(!palette.contains("teal-15"));
    }

    #[test]
    fn test_tonal_formula() {
        let primary = Palette::global().get("primary").unwrap();
        let three = Palette::global().get("primary-3").unwrap();
        assert!(approx(three.r, 0.1 * 0.8 + 0.6));
        assert!(approx(three.g, 1.0));
        // Clamped from 1.32.
        assert!(approx(three.b, 1.0));

        assert_eq!(tonal_variant(primary, 6), primary);
        assert!(approx(tonal_variant(primary, 7).b, 0.81));
        assert!(approx(tonal_variant(primary, 14).r, 0.1 * 0.3));
    }

    #[test]
    fn test_variants_stay_in_range() {
        let palette = Palette::global();
        for name in palette.base_names() {
            for tone in 1..=TONES {
                let c = palette.get(&format!("{}-{}", name, tone)).unwrap();
                for channel in [c.r, c.g, c.b] {
                    assert!((0.0..=1.0).contains(&channel), "{}-{}", name, tone);
                }
            }
        }
    }

    #[test]
    fn test_resolve_falls_back_to_base() {
        let palette = Palette::global();
        assert_eq!(palette.resolve("primary-3").map(|(n, _)| n), Some("primary-3"));
        assert_eq!(palette.resolve("primary-99").map(|(n, _)| n), Some("primary"));
        assert_eq!(palette.resolve("deep-purple-2").map(|(n, _)| n), Some("deep-purple-2"));
        assert_eq!(palette.resolve("doesnotexist"), None);
        assert_eq!(palette.resolve("nothing-4"), None);
        assert_eq!(palette.resolve("blue-x"), None);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Color::rgb(1.0, 0.0, 0.0).to_hex(), "#ff0000");
        assert_eq!(Color::BLACK.with_alpha(0.2).to_hex(), "#00000033");
    }
}
