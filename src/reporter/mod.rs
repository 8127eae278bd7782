pub mod html;
pub mod json;
pub mod sarif;
pub mod terminal;

pub use html::HtmlReporter;
pub use json::JsonReporter;
pub use sarif::SarifReporter;
pub use terminal::TerminalReporter;

use crate::cli::OutputFormat;
use crate::rules::ScanResult;

/// Renders a scan result into its final output string.
pub trait Reporter {
    fn report(&self, result: &ScanResult) -> String;
}

/// Picks the reporter for the requested output format.
pub fn for_format(format: OutputFormat, verbose: bool) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Terminal => Box::new(TerminalReporter::new(verbose)),
        OutputFormat::Json => Box::new(JsonReporter::new()),
        OutputFormat::Sarif => Box::new(SarifReporter::new()),
        OutputFormat::Html => Box::new(HtmlReporter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Finding, Severity};
    use std::path::{Path, PathBuf};

    fn sample_result() -> ScanResult {
        ScanResult {
            findings: vec![Finding::new(
                "transport-security",
                Severity::High,
                "Insecure transport",
                "HTTP URL configured for a remote MCP server.",
                Path::new("config.json"),
                "Use HTTPS.",
            )],
            scanned_files: vec![PathBuf::from("config.json")],
            duration_ms: 5,
            timestamp: "2025-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_for_format_terminal() {
        let output = for_format(OutputFormat::Terminal, false).report(&sample_result());
        assert!(output.contains("Insecure transport"));
    }

    #[test]
    fn test_for_format_json_is_parseable() {
        let output = for_format(OutputFormat::Json, false).report(&sample_result());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["findings"][0]["ruleId"], "transport-security");
    }

    #[test]
    fn test_for_format_sarif_version() {
        let output = for_format(OutputFormat::Sarif, false).report(&sample_result());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["version"], "2.1.0");
    }

    #[test]
    fn test_for_format_html_document() {
        let output = for_format(OutputFormat::Html, false).report(&sample_result());
        assert!(output.starts_with("<!DOCTYPE html>"));
    }
}
