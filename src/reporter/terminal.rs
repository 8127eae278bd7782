use crate::reporter::Reporter;
use crate::rules::{Finding, ScanResult, Severity};
use colored::Colorize;

/// Human-readable report for interactive use. Colors degrade to plain text
/// when stdout is not a terminal or `--no-color` is set.
pub struct TerminalReporter {
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn severity_icon(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Critical => "!!",
            Severity::High => "!",
            Severity::Medium => "~",
            Severity::Low => "-",
            Severity::Info => "i",
        }
    }

    fn severity_badge(&self, severity: Severity) -> String {
        let label = format!(" {} {} ", self.severity_icon(severity), severity);
        match severity {
            Severity::Critical => label.white().on_red().bold(),
            Severity::High => label.red().bold(),
            Severity::Medium => label.yellow().bold(),
            Severity::Low => label.blue(),
            Severity::Info => label.bright_black(),
        }
        .to_string()
    }

    fn summary_line(&self, findings: &[Finding]) -> String {
        let mut counts = [0usize; 5];
        for f in findings {
            counts[f.severity.rank() as usize] += 1;
        }
        let [critical, high, medium, low, info] = counts;

        let mut parts: Vec<String> = Vec::new();
        if critical > 0 {
            parts.push(
                format!(" {critical} CRITICAL ")
                    .white()
                    .on_red()
                    .bold()
                    .to_string(),
            );
        }
        if high > 0 {
            parts.push(format!("{high} HIGH").red().bold().to_string());
        }
        if medium > 0 {
            parts.push(format!("{medium} MEDIUM").yellow().bold().to_string());
        }
        if low > 0 {
            parts.push(format!("{low} LOW").blue().to_string());
        }
        if info > 0 {
            parts.push(format!("{info} INFO").bright_black().to_string());
        }
        parts.join("  ")
    }

    fn push_finding(&self, lines: &mut Vec<String>, finding: &Finding) {
        lines.push(format!(
            "  {}  {}",
            self.severity_badge(finding.severity),
            finding.title.bold()
        ));

        let location = match finding.line {
            Some(line) => format!("{}:{line}", finding.file_path),
            None => finding.file_path.clone(),
        };
        lines.push(
            format!("  Rule: {}  |  File: {}", finding.rule_id, location)
                .bright_black()
                .to_string(),
        );

        if let Some(evidence) = &finding.evidence {
            lines.push(format!("  {} {}", "Evidence:".bright_black(), evidence));
        }

        lines.push(format!(
            "  {} {}",
            "Fix:".bright_black(),
            finding.recommendation
        ));
        lines.push(String::new());
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, result: &ScanResult) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push(String::new());
        lines.push(
            "  MCP Fortify — MCP Configuration Security Scanner"
                .bold()
                .to_string(),
        );
        lines.push(
            format!(
                "  Scanned {} files in {}ms",
                result.scanned_files.len(),
                result.duration_ms
            )
            .bright_black()
            .to_string(),
        );
        lines.push(String::new());

        if self.verbose {
            lines.push("  Scanned files:".bright_black().to_string());
            for file in &result.scanned_files {
                lines.push(format!("    - {}", file.display()).bright_black().to_string());
            }
            lines.push(String::new());
        }

        if result.findings.is_empty() {
            lines.push("  No security issues found!".green().bold().to_string());
            lines.push(String::new());
            return lines.join("\n");
        }

        lines.push(format!("  {}", self.summary_line(&result.findings)));
        lines.push(String::new());

        for finding in &result.findings {
            self.push_finding(&mut lines, finding);
        }

        lines.join("\n")
    }
}
