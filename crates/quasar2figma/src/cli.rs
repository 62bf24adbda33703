//! Command-line argument parsing.

use clap::Parser;
use quasar_render::Density;
use std::path::PathBuf;

/// Convert Quasar single-file components into design-tool render trees
#[derive(Parser, Debug, Clone)]
#[command(name = "quasar2figma")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Component files or directories to convert
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Path to a settings file (defaults to the nearest quasar2figma.json)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "human")]
    pub output: OutputFormat,

    /// Re-convert files when they change
    #[arg(short, long)]
    pub watch: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Ignore patterns (glob)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Spacing density
    #[arg(long)]
    pub density: Option<DensityArg>,

    /// Render a component category with the generic processor
    #[arg(long = "disable-category", value_name = "CATEGORY")]
    pub disabled_categories: Vec<String>,

    /// Do not paint palette colors named by the source
    #[arg(long)]
    pub no_preserve_colors: bool,
}

/// Output format for conversion results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// File headers, structure trees and a summary
    #[default]
    Human,
    /// One host-protocol message per line
    Json,
    /// Structure trees only
    Tree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DensityArg {
    Compact,
    Default,
    Comfortable,
}

impl From<DensityArg> for Density {
    fn from(arg: DensityArg) -> Self {
        match arg {
            DensityArg::Compact => Density::Compact,
            DensityArg::Default => Density::Default,
            DensityArg::Comfortable => Density::Comfortable,
        }
    }
}

impl Args {
    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
