//! Output formatting for conversion results.

use crate::cli::OutputFormat;
use crate::runner::RunSummary;
use quasar_render::HostResponse;
use std::fmt::Write as _;
use std::path::Path;

/// Formatter for conversion output.
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the messages produced for one file.
    pub fn print_file(&self, file: &Path, messages: &[HostResponse]) {
        let text = self.format_file(file, messages);
        if !text.is_empty() {
            println!("{}", text);
        }
    }

    /// Print the summary.
    pub fn print_summary(&self, summary: &RunSummary) {
        if let Some(text) = self.format_summary(summary) {
            println!("{}", text);
        }
    }

    pub fn format_file(&self, file: &Path, messages: &[HostResponse]) -> String {
        match self.format {
            OutputFormat::Human => format_human(file, messages),
            OutputFormat::Json => format_json(messages),
            OutputFormat::Tree => format_tree(messages),
        }
    }

    pub fn format_summary(&self, summary: &RunSummary) -> Option<String> {
        match self.format {
            OutputFormat::Human => Some(summary_human(summary)),
            OutputFormat::Json => Some(
                serde_json::json!({
                    "type": "summary",
                    "files": summary.file_count,
                    "failed": summary.failed_count,
                    "duration_ms": summary.duration_ms
                })
                .to_string(),
            ),
            // Trees only
            OutputFormat::Tree => None,
        }
    }
}

// Human format

fn format_human(file: &Path, messages: &[HostResponse]) -> String {
    let mut out = String::new();
    for message in messages {
        match message {
            HostResponse::Success { structure } => {
                let _ = writeln!(out, "\x1b[32m✓\x1b[0m {}", file.display());
                for line in structure.lines() {
                    let _ = writeln!(out, "    {}", line);
                }
            }
            HostResponse::Error { message } => {
                let _ = writeln!(out, "{}: \x1b[31merror\x1b[0m: {}", file.display(), message);
            }
            HostResponse::Progress { .. } => {}
        }
    }
    out.trim_end().to_string()
}

fn summary_human(summary: &RunSummary) -> String {
    let converted = summary.file_count - summary.failed_count;
    if summary.failed_count == 0 {
        format!(
            "\n\x1b[32m✓\x1b[0m Converted {} file{} ({}ms)",
            converted,
            if converted == 1 { "" } else { "s" },
            summary.duration_ms
        )
    } else {
        format!(
            "\n\x1b[31m✗\x1b[0m {} of {} file{} failed\nTime: {}ms",
            summary.failed_count,
            summary.file_count,
            if summary.file_count == 1 { "" } else { "s" },
            summary.duration_ms
        )
    }
}

// JSON format

fn format_json(messages: &[HostResponse]) -> String {
    messages
        .iter()
        .filter_map(|message| serde_json::to_string(message).ok())
        .collect::<Vec<_>>()
        .join("\n")
}

// Tree format

fn format_tree(messages: &[HostResponse]) -> String {
    messages
        .iter()
        .filter_map(|message| match message {
            HostResponse::Success { structure } => Some(structure.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn messages() -> Vec<HostResponse> {
        vec![
            HostResponse::progress("Converting component"),
            HostResponse::Success {
                structure: "Componente Quasar (FRAME) [Column]\n  div (FRAME) [Column]".into(),
            },
        ]
    }

    #[test]
    fn test_tree_output_is_structure_only() {
        let formatter = OutputFormatter::new(OutputFormat::Tree);
        assert_eq!(
            formatter.format_file(Path::new("App.vue"), &messages()),
            "Componente Quasar (FRAME) [Column]\n  div (FRAME) [Column]"
        );
        assert_eq!(
            formatter.format_summary(&RunSummary {
                file_count: 1,
                failed_count: 0,
                duration_ms: 3
            }),
            None
        );
    }

    #[test]
    fn test_json_output_one_message_per_line() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let text = formatter.format_file(Path::new("App.vue"), &messages());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"type":"progress","message":"Converting component"}"#);
        let success: HostResponse = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(success, messages()[1]);
    }

    #[test]
    fn test_human_output_indents_structure() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let text = formatter.format_file(Path::new("App.vue"), &messages());
        assert!(text.contains("App.vue"));
        assert!(text.ends_with("      div (FRAME) [Column]"));

        let error = [HostResponse::Error {
            message: "template not found in component source".into(),
        }];
        assert!(formatter
            .format_file(Path::new("Bad.vue"), &error)
            .contains("template not found"));
    }
}
