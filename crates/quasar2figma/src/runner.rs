//! Runs conversions over the requested files.

use crate::cli::Args;
use crate::config::Config;
use crate::output::OutputFormatter;
use globset::{Glob, GlobSet, GlobSetBuilder};
use miette::{IntoDiagnostic, Result, WrapErr};
use quasar_render::{handle_request, HostRequest, HostResponse};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of files converted or attempted.
    pub file_count: usize,
    /// Number of files whose conversion failed.
    pub failed_count: usize,
    /// Time taken.
    pub duration_ms: u64,
}

pub struct Runner {
    config: Config,
    args: Args,
    ignore: GlobSet,
    formatter: OutputFormatter,
}

impl Runner {
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::load(&args)?;
        if let Some(path) = &config.settings_path {
            tracing::debug!(path = %path.display(), "loaded settings");
        }
        let ignore = build_ignore(&config.ignore_patterns)?;
        let formatter = OutputFormatter::new(args.output);

        Ok(Self {
            config,
            args,
            ignore,
            formatter,
        })
    }

    /// Convert every component once.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let start = Instant::now();
        let files = self.find_components();
        tracing::debug!(count = files.len(), "found components");

        let mut summary = RunSummary {
            file_count: files.len(),
            ..Default::default()
        };
        for file in &files {
            if !self.convert_file(file).await? {
                summary.failed_count += 1;
            }
        }
        summary.duration_ms = start.elapsed().as_millis() as u64;

        self.formatter.print_summary(&summary);
        Ok(summary)
    }

    /// Convert once, then again for every changed component.
    pub async fn run_watch(&self) -> Result<()> {
        use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};
        use std::sync::mpsc::channel;
        use std::time::Duration;

        eprintln!("Starting watch mode...\n");
        self.run_once().await?;

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default().with_poll_interval(Duration::from_millis(500)),
        )
        .into_diagnostic()?;

        for path in &self.args.paths {
            watcher
                .watch(path, RecursiveMode::Recursive)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to watch {}", path.display()))?;
        }

        loop {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => {
                    let changed: Vec<&PathBuf> = event
                        .paths
                        .iter()
                        .filter(|p| p.is_file() && self.is_component(p))
                        .collect();
                    for path in changed {
                        eprintln!("File change detected: {}\n", path.display());
                        if let Err(err) = self.convert_file(path).await {
                            eprintln!("{:?}", err);
                        }
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        Ok(())
    }

    /// Every component file under the requested paths, sorted.
    pub fn find_components(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for root in &self.args.paths {
            for entry in walkdir::WalkDir::new(root)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if entry.file_type().is_file() && self.is_component(path) {
                    files.push(path.to_path_buf());
                }
            }
        }
        files.sort();
        files.dedup();
        files
    }

    fn is_component(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "vue") && !self.ignore.is_match(path)
    }

    /// Convert one file and print the result. Returns whether it succeeded.
    async fn convert_file(&self, path: &Path) -> Result<bool> {
        let code = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

        let messages = handle_request(HostRequest::Convert {
            code,
            settings: self.config.settings.clone(),
        })
        .await;
        self.formatter.print_file(path, &messages);

        Ok(matches!(messages.last(), Some(HostResponse::Success { .. })))
    }
}

fn build_ignore(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .into_diagnostic()
            .wrap_err_with(|| format!("Invalid ignore pattern `{}`", pattern))?;
        builder.add(glob);
    }
    builder.build().into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn runner(root: &Path, extra: &[&str]) -> Runner {
        let root = root.to_string_lossy().to_string();
        let argv = ["quasar2figma", root.as_str(), "--output", "tree"]
            .into_iter()
            .chain(extra.iter().copied());
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.output, OutputFormat::Tree);
        Runner::new(args).unwrap()
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_find_components_honours_ignores() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/App.vue", "<template><div/></template>");
        write(dir.path(), "src/legacy/Old.vue", "<template><div/></template>");
        write(dir.path(), "node_modules/lib/Dep.vue", "<template><div/></template>");
        write(dir.path(), "src/main.ts", "");

        let files = runner(dir.path(), &["--ignore", "**/legacy/**"]).find_components();
        assert_eq!(files, vec![dir.path().join("src/App.vue")]);
    }

    #[tokio::test]
    async fn test_run_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Good.vue", r#"<template><q-btn label="Ok" /></template>"#);
        write(dir.path(), "Bad.vue", "<script>export default {}</script>");

        let summary = runner(dir.path(), &[]).run_once().await.unwrap();
        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.failed_count, 1);
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        assert!(build_ignore(&["a/{b".to_string()]).is_err());
    }
}
