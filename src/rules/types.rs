use crate::discovery::ScanTarget;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Finding severity, declared most severe first so the derived ordering
/// follows the rank table below.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// Explicit rank table: critical=0 .. info=4. Lower rank = more severe.
    /// Filtering keeps rank <= threshold; sorting is ascending rank.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Info => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    pub fn all() -> &'static [Severity] {
        &[
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
            Severity::Info,
        ]
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// One reported issue, tied to exactly one rule and one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub file_path: String,
    /// 1-based; absent for file-level findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Short, possibly-redacted excerpt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    pub recommendation: String,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        file_path: &Path,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            title: title.into(),
            description: description.into(),
            file_path: file_path.display().to_string(),
            line: None,
            evidence: None,
            recommendation: recommendation.into(),
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    /// Per-finding severity override of the producing rule's default.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Per-severity finding counts derived from a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub passed: bool,
}

impl Summary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut counts = [0usize; 5];
        for f in findings {
            counts[f.severity.rank() as usize] += 1;
        }
        let [critical, high, medium, low, info] = counts;

        Self {
            critical,
            high,
            medium,
            low,
            info,
            passed: critical == 0 && high == 0,
        }
    }
}

/// Everything one scan invocation produced. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Sorted by severity rank ascending (most severe first).
    pub findings: Vec<Finding>,
    /// Exactly the paths discovery produced, readable or not.
    pub scanned_files: Vec<PathBuf>,
    /// Wall-clock scan duration in milliseconds.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// RFC 3339 UTC timestamp of scan completion.
    pub timestamp: String,
}

/// A security rule. Each rule sees the full target list per scan, so rules
/// that reason across files (gitignore coverage, for one) need no special
/// plumbing.
pub trait Rule: Send + Sync {
    /// Stable kebab-case identifier, also used for `--rules` selection.
    fn id(&self) -> &str;

    /// Human-readable rule name.
    fn name(&self) -> &str;

    /// Default severity stamped on findings unless overridden per finding.
    fn severity(&self) -> Severity;

    /// One-line description for reports and the SARIF rule catalog.
    fn description(&self) -> &str;

    /// Runs the rule over every target, returning zero or more findings.
    fn run(&self, targets: &[ScanTarget]) -> Vec<Finding>;

    /// Builds a finding stamped with this rule's id and default severity.
    fn finding(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        file_path: &Path,
        recommendation: impl Into<String>,
    ) -> Finding
    where
        Self: Sized,
    {
        Finding::new(
            self.id(),
            self.severity(),
            title,
            description,
            file_path,
            recommendation,
        )
    }
}

/// Caps evidence excerpts at 100 chars so findings stay one-line friendly.
pub(crate) fn truncate_evidence(line: &str) -> String {
    if line.chars().count() > 100 {
        let head: String = line.chars().take(100).collect();
        format!("{head}...")
    } else {
        line.to_string()
    }
}
