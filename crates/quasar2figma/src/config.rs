//! Configuration loading and management.

use crate::cli::Args;
use miette::{IntoDiagnostic, Result, WrapErr};
use quasar_render::ConversionSettings;
use quasar_style::Category;
use std::path::{Path, PathBuf};

/// Settings file looked up next to the inputs.
pub const CONFIG_FILE: &str = "quasar2figma.json";

/// Configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings passed to every conversion.
    pub settings: ConversionSettings,
    /// Where the settings came from, if a file was used.
    pub settings_path: Option<PathBuf>,
    /// Ignore patterns.
    pub ignore_patterns: Vec<String>,
}

impl Config {
    /// Load configuration from CLI arguments and the settings file.
    pub fn load(args: &Args) -> Result<Self> {
        let settings_path = match &args.settings {
            Some(path) => Some(path.clone()),
            None => args.paths.first().and_then(|p| find_config(p)),
        };

        let mut settings = match &settings_path {
            Some(path) => read_settings(path)?,
            None => ConversionSettings::default(),
        };
        apply_overrides(&mut settings, args)?;

        let mut ignore_patterns = vec![
            "**/node_modules/**".to_string(),
            "**/dist/**".to_string(),
            "**/.git/**".to_string(),
        ];
        ignore_patterns.extend(args.ignore.iter().cloned());

        Ok(Self {
            settings,
            settings_path,
            ignore_patterns,
        })
    }
}

/// Find the nearest settings file at or above `start`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let start = if start.is_file() { start.parent()? } else { start };
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

fn read_settings(path: &Path) -> Result<ConversionSettings> {
    let content = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Invalid settings in {}", path.display()))
}

/// Command-line flags win over file values.
fn apply_overrides(settings: &mut ConversionSettings, args: &Args) -> Result<()> {
    if let Some(density) = args.density {
        settings.density = density.into();
    }
    if args.no_preserve_colors {
        settings.preserve_source_colors = false;
    }
    for name in &args.disabled_categories {
        let category = Category::from_name(name)
            .filter(|c| Category::CONFIGURABLE.contains(c))
            .ok_or_else(|| {
                miette::miette!(
                    help = "expected one of basic, form, layout, navigation, popup, scrolling, display, other",
                    "unknown component category `{}`",
                    name
                )
            })?;
        settings.set_category_enabled(category, false);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use quasar_render::Density;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("quasar2figma").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_nearest_config_wins() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src/components");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();
        std::fs::write(dir.path().join("src").join(CONFIG_FILE), "{}").unwrap();
        let file = nested.join("Card.vue");
        std::fs::write(&file, "<template><div/></template>").unwrap();

        assert_eq!(find_config(&file), Some(dir.path().join("src").join(CONFIG_FILE)));
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "componentDensity": "comfortable", "componentGroups": { "form": false } }"#,
        )
        .unwrap();
        let path = dir.path().to_string_lossy().to_string();

        let config = Config::load(&args(&[&path])).unwrap();
        assert_eq!(config.settings.density, Density::Comfortable);
        assert!(!config.settings.is_category_enabled(Category::Form));
        assert!(config.settings_path.is_some());

        let config = Config::load(&args(&[
            &path,
            "--density",
            "compact",
            "--disable-category",
            "popup",
            "--no-preserve-colors",
        ]))
        .unwrap();
        assert_eq!(config.settings.density, Density::Compact);
        assert!(!config.settings.is_category_enabled(Category::Popup));
        assert!(!config.settings.preserve_source_colors);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().to_string();
        assert!(Config::load(&args(&[&path, "--disable-category", "html"])).is_err());
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().to_string();
        let config = Config::load(&args(&[&path, "--ignore", "**/legacy/**"])).unwrap();
        assert_eq!(config.settings_path, None);
        assert_eq!(config.settings, ConversionSettings::default());
        assert_eq!(config.ignore_patterns.last().map(String::as_str), Some("**/legacy/**"));
    }
}
