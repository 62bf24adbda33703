//! Conversion settings.

use indexmap::IndexMap;
use quasar_style::Category;
use serde::{Deserialize, Serialize};

/// Spacing density applied by processors that have a dense form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Compact,
    #[default]
    Default,
    Comfortable,
}

impl Density {
    /// Extra vertical padding for comfortable density.
    pub fn vertical_bonus(&self) -> f64 {
        match self {
            Density::Comfortable => 4.0,
            _ => 0.0,
        }
    }
}

/// Options recognized by a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionSettings {
    /// Paint palette colors named by the source.
    #[serde(alias = "preserveQuasarColors")]
    pub preserve_source_colors: bool,
    #[serde(alias = "createComponentVariants")]
    pub generate_variants: bool,
    /// Map `100%` sizes to stretch-in-parent.
    #[serde(alias = "useAutoLayout")]
    pub use_auto_layout_stretch: bool,
    #[serde(alias = "componentDensity")]
    pub density: Density,
    pub color_theme: String,
    /// Missing categories count as enabled.
    #[serde(alias = "componentGroups")]
    pub enabled_categories: IndexMap<String, bool>,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            preserve_source_colors: true,
            generate_variants: true,
            use_auto_layout_stretch: true,
            density: Density::Default,
            color_theme: "quasar-default".to_string(),
            enabled_categories: Category::CONFIGURABLE
                .iter()
                .map(|c| (c.as_str().to_string(), true))
                .collect(),
        }
    }
}

impl ConversionSettings {
    /// Whether processors for `category` may run. `quasar` and `html` are
    /// always enabled.
    pub fn is_category_enabled(&self, category: Category) -> bool {
        self.enabled_categories
            .get(category.as_str())
            .copied()
            .unwrap_or(true)
    }

    pub fn set_category_enabled(&mut self, category: Category, enabled: bool) {
        self.enabled_categories
            .insert(category.as_str().to_string(), enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = ConversionSettings::default();
        assert!(settings.preserve_source_colors);
        assert_eq!(settings.color_theme, "quasar-default");
        assert_eq!(settings.enabled_categories.len(), 8);
        assert!(settings.is_category_enabled(Category::Html));
    }

    #[test]
    fn test_host_aliases() {
        let json = r#"{
            "preserveQuasarColors": false,
            "useAutoLayout": false,
            "componentDensity": "compact",
            "componentGroups": { "basic": false }
        }"#;
        let settings: ConversionSettings = serde_json::from_str(json).unwrap();
        assert!(!settings.preserve_source_colors);
        assert!(!settings.use_auto_layout_stretch);
        assert!(settings.generate_variants);
        assert_eq!(settings.density, Density::Compact);
        assert!(!settings.is_category_enabled(Category::Basic));
        assert!(settings.is_category_enabled(Category::Form));
    }

    #[test]
    fn test_canonical_names_round_trip() {
        let mut settings = ConversionSettings::default();
        settings.set_category_enabled(Category::Popup, false);
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["enabledCategories"]["popup"], false);
        assert_eq!(json["density"], "default");
        let back: ConversionSettings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }
}
