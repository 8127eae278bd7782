use crate::reporter::Reporter;
use crate::rules::ScanResult;

/// Serializes the result as pretty-printed JSON, the machine-readable twin of
/// the terminal report.
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn report(&self, result: &ScanResult) -> String {
        serde_json::to_string_pretty(result)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize result: {}"}}"#, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Finding, Severity};
    use std::path::{Path, PathBuf};

    fn result_with(findings: Vec<Finding>) -> ScanResult {
        ScanResult {
            findings,
            scanned_files: vec![PathBuf::from("/home/user/.claude/settings.json")],
            duration_ms: 42,
            timestamp: "2026-02-01T12:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_json_output_structure() {
        let reporter = JsonReporter::new();
        let output = reporter.report(&result_with(vec![]));

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["findings"].as_array().unwrap().len(), 0);
        assert_eq!(parsed["scannedFiles"][0], "/home/user/.claude/settings.json");
        assert_eq!(parsed["duration"], 42);
        assert_eq!(parsed["timestamp"], "2026-02-01T12:00:00+00:00");
    }

    #[test]
    fn test_json_output_with_findings() {
        let reporter = JsonReporter::new();
        let finding = Finding::new(
            "hardcoded-secrets",
            Severity::Critical,
            "Hardcoded OpenAI API key",
            "An API key is embedded in the configuration.",
            Path::new("/home/user/.mcp.json"),
            "Move the key into an environment reference.",
        )
        .with_line(10)
        .with_evidence("OPENAI_API_KEY=sk-****");
        let output = reporter.report(&result_with(vec![finding]));

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["findings"][0]["ruleId"], "hardcoded-secrets");
        assert_eq!(parsed["findings"][0]["severity"], "critical");
        assert_eq!(parsed["findings"][0]["line"], 10);
        assert_eq!(parsed["findings"][0]["evidence"], "OPENAI_API_KEY=sk-****");
    }

    #[test]
    fn test_json_omits_unset_optional_fields() {
        let reporter = JsonReporter::new();
        let finding = Finding::new(
            "missing-gitignore",
            Severity::Low,
            "Sensitive files not ignored",
            ".gitignore does not cover .env files.",
            Path::new("/repo/.gitignore"),
            "Add .env to .gitignore.",
        );
        let output = reporter.report(&result_with(vec![finding]));

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed["findings"][0].get("line").is_none());
        assert!(parsed["findings"][0].get("evidence").is_none());
    }

    #[test]
    #[allow(clippy::default_constructed_unit_structs)]
    fn test_json_default_trait() {
        let reporter = JsonReporter::default();
        let output = reporter.report(&result_with(vec![]));
        assert!(output.contains("\"findings\": []"));
    }
}
