//! User-defined rules loaded from a YAML file (`--custom-rules FILE`).
//!
//! Custom rules are plain line-matchers: each rule carries one or more regex
//! patterns and produces a finding for every non-blank line that matches one
//! of them. Validation happens entirely at load time so a scan never runs
//! with a half-broken rule.

use crate::discovery::ScanTarget;
use crate::rules::types::{truncate_evidence, Finding, Rule, Severity};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomRuleError {
    #[error("cannot read custom rules file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid custom rules YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("custom rule \"{rule_id}\": missing required field \"{field}\"")]
    EmptyField {
        rule_id: String,
        field: &'static str,
    },

    #[error("custom rule \"{rule_id}\": unknown severity \"{value}\" (expected critical, high, medium, low, or info)")]
    InvalidSeverity { rule_id: String, value: String },

    #[error("custom rule \"{rule_id}\": invalid pattern \"{pattern}\": {source}")]
    InvalidPattern {
        rule_id: String,
        pattern: String,
        source: regex::Error,
    },
}

/// Top-level shape of a custom rules file.
#[derive(Debug, Deserialize)]
pub struct CustomRulesConfig {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub rules: Vec<YamlRule>,
}

/// One rule as written in YAML, before validation.
#[derive(Debug, Deserialize)]
pub struct YamlRule {
    pub id: String,
    pub name: String,
    pub severity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
}

/// A validated custom rule, ready to scan.
#[derive(Debug)]
pub struct CustomRule {
    id: String,
    name: String,
    severity: Severity,
    description: String,
    recommendation: String,
    patterns: Vec<Regex>,
}

impl Rule for CustomRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn run(&self, targets: &[ScanTarget]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for target in targets {
            let Some(content) = &target.content else {
                continue;
            };

            for (idx, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                // one finding per line, first matching pattern wins
                if self.patterns.iter().any(|p| p.is_match(line)) {
                    findings.push(
                        self.finding(
                            self.name.clone(),
                            self.description.clone(),
                            &target.path,
                            self.recommendation.clone(),
                        )
                        .with_line(idx + 1)
                        .with_evidence(truncate_evidence(line.trim())),
                    );
                }
            }
        }

        findings
    }
}

pub struct CustomRuleLoader;

impl CustomRuleLoader {
    /// Loads and validates every rule in `path`. Any invalid rule fails the
    /// whole file; callers degrade to zero custom rules on error.
    pub fn load_from_file(path: &Path) -> Result<Vec<CustomRule>, CustomRuleError> {
        let content = fs::read_to_string(path).map_err(|source| CustomRuleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_string(&content)
    }

    pub fn load_from_string(content: &str) -> Result<Vec<CustomRule>, CustomRuleError> {
        let config: CustomRulesConfig = serde_yaml::from_str(content)?;
        config.rules.into_iter().map(Self::convert).collect()
    }

    fn convert(rule: YamlRule) -> Result<CustomRule, CustomRuleError> {
        if rule.id.trim().is_empty() {
            return Err(CustomRuleError::EmptyField {
                rule_id: rule.name.clone(),
                field: "id",
            });
        }
        if rule.name.trim().is_empty() {
            return Err(CustomRuleError::EmptyField {
                rule_id: rule.id.clone(),
                field: "name",
            });
        }
        if rule.patterns.is_empty() {
            return Err(CustomRuleError::EmptyField {
                rule_id: rule.id.clone(),
                field: "patterns",
            });
        }

        let severity = Self::parse_severity(&rule.id, &rule.severity)?;

        let patterns = rule
            .patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| CustomRuleError::InvalidPattern {
                    rule_id: rule.id.clone(),
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let description = if rule.description.trim().is_empty() {
            format!("Line matched custom rule \"{}\".", rule.id)
        } else {
            rule.description
        };
        let recommendation = if rule.recommendation.trim().is_empty() {
            "Review the flagged line and remove or rewrite it if it is unsafe.".to_string()
        } else {
            rule.recommendation
        };

        Ok(CustomRule {
            id: rule.id,
            name: rule.name,
            severity,
            description,
            recommendation,
            patterns,
        })
    }

    fn parse_severity(rule_id: &str, value: &str) -> Result<Severity, CustomRuleError> {
        match value.to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            "info" => Ok(Severity::Info),
            _ => Err(CustomRuleError::InvalidSeverity {
                rule_id: rule_id.to_string(),
                value: value.to_string(),
            }),
        }
    }
}
