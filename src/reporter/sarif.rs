use crate::reporter::Reporter;
use crate::rules::{all_rules, Finding, ScanResult, Severity};
use serde::Serialize;

// SARIF v2.1.0 spec: https://docs.oasis-open.org/sarif/sarif/v2.1.0/sarif-v2.1.0.html

pub struct SarifReporter;

impl SarifReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SarifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for SarifReporter {
    fn report(&self, result: &ScanResult) -> String {
        let sarif = SarifReport::from_scan_result(result);
        serde_json::to_string_pretty(&sarif)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize SARIF: {}"}}"#, e))
    }
}

#[derive(Debug, Serialize)]
pub struct SarifReport {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
    pub invocations: Vec<SarifInvocation>,
}

#[derive(Debug, Serialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    pub short_description: SarifMessage,
    pub default_configuration: SarifRuleConfiguration,
    pub properties: SarifRuleProperties,
}

#[derive(Debug, Serialize)]
pub struct SarifRuleConfiguration {
    pub level: String,
}

#[derive(Debug, Serialize)]
pub struct SarifRuleProperties {
    pub severity: Severity,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
    pub properties: SarifResultProperties,
}

#[derive(Debug, Serialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    /// Present only for line-level findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<SarifRegion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifactLocation {
    pub uri: String,
    pub uri_base_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: usize,
}

#[derive(Debug, Serialize)]
pub struct SarifResultProperties {
    pub severity: Severity,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifInvocation {
    pub execution_successful: bool,
    pub end_time_utc: String,
    pub properties: SarifInvocationProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifInvocationProperties {
    pub duration: String,
    pub scanned_files: usize,
}

impl SarifReport {
    pub fn from_scan_result(result: &ScanResult) -> Self {
        // The catalog always lists every built-in rule, not just the ones
        // that fired, so consumers can resolve any ruleId.
        let rules: Vec<SarifRule> = all_rules()
            .iter()
            .map(|rule| SarifRule {
                id: rule.id().to_string(),
                name: rule.name().to_string(),
                short_description: SarifMessage {
                    text: rule.description().to_string(),
                },
                default_configuration: SarifRuleConfiguration {
                    level: Self::severity_to_level(rule.severity()).to_string(),
                },
                properties: SarifRuleProperties {
                    severity: rule.severity(),
                },
            })
            .collect();

        let results: Vec<SarifResult> = result.findings.iter().map(Self::build_result).collect();

        SarifReport {
            schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json".to_string(),
            version: "2.1.0".to_string(),
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "mcp-fortify".to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                        information_uri: "https://github.com/SSMMSS884/mcp-fortify".to_string(),
                        rules,
                    },
                },
                results,
                invocations: vec![SarifInvocation {
                    execution_successful: true,
                    end_time_utc: result.timestamp.clone(),
                    properties: SarifInvocationProperties {
                        duration: format!("{}ms", result.duration_ms),
                        scanned_files: result.scanned_files.len(),
                    },
                }],
            }],
        }
    }

    fn build_result(finding: &Finding) -> SarifResult {
        SarifResult {
            rule_id: finding.rule_id.clone(),
            level: Self::severity_to_level(finding.severity).to_string(),
            message: SarifMessage {
                text: finding.description.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation {
                        uri: finding.file_path.clone(),
                        uri_base_id: "%SRCROOT%".to_string(),
                    },
                    region: finding.line.map(|line| SarifRegion { start_line: line }),
                },
            }],
            properties: SarifResultProperties {
                severity: finding.severity,
                recommendation: finding.recommendation.clone(),
                evidence: finding.evidence.clone(),
            },
        }
    }

    fn severity_to_level(severity: Severity) -> &'static str {
        match severity {
            Severity::Critical | Severity::High => "error",
            Severity::Medium => "warning",
            Severity::Low | Severity::Info => "note",
        }
    }
}
