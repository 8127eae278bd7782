//! Scan orchestration: discovery, rule execution, filtering, ordering.

use crate::discovery::discover_targets;
use crate::rules::custom::{CustomRule, CustomRuleLoader};
use crate::rules::{all_rules, select_rules, Finding, Rule, ScanResult, Severity, Summary};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Everything that shapes one scan invocation.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Extra project directory to scan alongside the home-level configs.
    pub path: Option<PathBuf>,
    /// Built-in rule ids to run; empty means all of them.
    pub rules: Vec<String>,
    /// Optional YAML file of user-defined rules.
    pub custom_rules: Option<PathBuf>,
    /// Drop findings less severe than this (e.g. `High` keeps critical+high).
    pub min_severity: Option<Severity>,
}

/// Runs a full scan. Never fails: unreadable sources are skipped during
/// discovery and a bad custom rules file degrades to zero custom rules.
pub fn scan(options: &ScanOptions) -> ScanResult {
    let started = Instant::now();

    let targets = discover_targets(options.path.as_deref());
    debug!(targets = targets.len(), "discovery complete");

    let builtin: Vec<&dyn Rule> = if options.rules.is_empty() {
        all_rules().iter().map(|rule| rule.as_ref()).collect()
    } else {
        select_rules(&options.rules)
    };
    let custom = load_custom_rules(options.custom_rules.as_deref());

    let mut findings = Vec::new();
    for rule in &builtin {
        findings.extend(rule.run(&targets));
    }
    for rule in &custom {
        findings.extend(rule.run(&targets));
    }

    order_findings(&mut findings, options.min_severity);

    ScanResult {
        findings,
        scanned_files: targets.into_iter().map(|t| t.path).collect(),
        duration_ms: started.elapsed().as_millis() as u64,
        timestamp: Utc::now().to_rfc3339(),
    }
}

/// Drops findings below the severity threshold, then sorts the remainder
/// ascending by rank. The sort is stable, so findings of equal severity keep
/// rule execution order no matter what order the rules produced them in.
fn order_findings(findings: &mut Vec<Finding>, min_severity: Option<Severity>) {
    if let Some(threshold) = min_severity {
        findings.retain(|f| f.severity.rank() <= threshold.rank());
    }
    findings.sort_by_key(|f| f.severity.rank());
}

/// Process exit code for a finished scan. Outside CI a scan always exits 0;
/// with `--ci` any critical or high finding fails the build with 1.
pub fn exit_code(result: &ScanResult, ci: bool) -> u8 {
    if !ci {
        return 0;
    }
    if Summary::from_findings(&result.findings).passed {
        0
    } else {
        1
    }
}

fn load_custom_rules(path: Option<&Path>) -> Vec<CustomRule> {
    let Some(path) = path else {
        return Vec::new();
    };

    match CustomRuleLoader::load_from_file(path) {
        Ok(rules) => {
            if !rules.is_empty() {
                eprintln!(
                    "Loaded {} custom rule(s) from {}",
                    rules.len(),
                    path.display()
                );
            }
            rules
        }
        Err(e) => {
            warn!(error = %e, "Failed to load custom rules");
            eprintln!("Warning: Failed to load custom rules: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn finding(severity: Severity) -> Finding {
        Finding::new(
            "test-rule",
            severity,
            "Test",
            "Test finding",
            Path::new("/tmp/x.json"),
            "Fix it",
        )
    }

    fn result_with(findings: Vec<Finding>) -> ScanResult {
        ScanResult {
            findings,
            scanned_files: vec![],
            duration_ms: 0,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    fn titled(severity: Severity, title: &str) -> Finding {
        let mut f = finding(severity);
        f.title = title.to_string();
        f
    }

    #[test]
    fn test_order_findings_ascending_by_rank() {
        let mut findings = vec![
            finding(Severity::Low),
            finding(Severity::Critical),
            finding(Severity::Medium),
            finding(Severity::High),
        ];
        order_findings(&mut findings, None);

        let ranks: Vec<u8> = findings.iter().map(|f| f.severity.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_order_findings_stable_for_equal_severity() {
        let mut findings = vec![
            titled(Severity::High, "first high"),
            finding(Severity::Critical),
            titled(Severity::High, "second high"),
        ];
        order_findings(&mut findings, None);

        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[1].title, "first high");
        assert_eq!(findings[2].title, "second high");
    }

    #[test]
    fn test_order_findings_same_result_for_permuted_input() {
        let sort = |severities: &[Severity]| {
            let mut v: Vec<Finding> = severities.iter().map(|s| finding(*s)).collect();
            order_findings(&mut v, None);
            v.iter().map(|f| f.severity).collect::<Vec<_>>()
        };

        let forward = sort(&[Severity::Critical, Severity::High, Severity::Medium, Severity::Low]);
        let backward = sort(&[Severity::Low, Severity::Medium, Severity::High, Severity::Critical]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_order_findings_filter_keeps_threshold_and_above() {
        let mut findings = vec![
            finding(Severity::Critical),
            finding(Severity::Medium),
            finding(Severity::Info),
        ];
        order_findings(&mut findings, Some(Severity::Medium));

        assert_eq!(findings.len(), 2);
        assert!(findings
            .iter()
            .all(|f| f.severity.rank() <= Severity::Medium.rank()));
    }

    #[test]
    fn test_order_findings_no_threshold_keeps_everything() {
        let mut findings = vec![finding(Severity::Info), finding(Severity::Critical)];
        order_findings(&mut findings, None);
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_exit_code_zero_outside_ci() {
        let result = result_with(vec![finding(Severity::Critical)]);
        assert_eq!(exit_code(&result, false), 0);
    }

    #[test]
    fn test_exit_code_ci_fails_on_high() {
        let result = result_with(vec![finding(Severity::High)]);
        assert_eq!(exit_code(&result, true), 1);
    }

    #[test]
    fn test_exit_code_ci_passes_on_medium_and_below() {
        let result = result_with(vec![finding(Severity::Medium), finding(Severity::Info)]);
        assert_eq!(exit_code(&result, true), 0);
    }

    #[test]
    fn test_scan_picks_up_project_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".mcp.json"),
            r#"{"mcpServers": {"s": {"env": {"API_KEY": "sk-abcdefghij1234567890abcd"}}}}"#,
        )
        .unwrap();

        let options = ScanOptions {
            path: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let result = scan(&options);

        let mcp_path = dir.path().join(".mcp.json");
        assert!(result.scanned_files.contains(&mcp_path));
        assert!(result
            .findings
            .iter()
            .any(|f| f.file_path == mcp_path.display().to_string()));
    }

    #[test]
    fn test_scan_findings_sorted_by_severity() {
        let dir = TempDir::new().unwrap();
        // one critical (secret) and one medium (0.0.0.0 bind) in the same file
        fs::write(
            dir.path().join(".mcp.json"),
            r#"{"mcpServers": {"s": {"env": {"API_KEY": "sk-abcdefghij1234567890abcd"}, "host": "0.0.0.0"}}}"#,
        )
        .unwrap();

        let options = ScanOptions {
            path: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let result = scan(&options);

        assert!(result
            .findings
            .windows(2)
            .all(|w| w[0].severity.rank() <= w[1].severity.rank()));
    }

    #[test]
    fn test_scan_severity_filter() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".mcp.json"),
            r#"{"mcpServers": {"s": {"host": "0.0.0.0"}}}"#,
        )
        .unwrap();

        let options = ScanOptions {
            path: Some(dir.path().to_path_buf()),
            min_severity: Some(Severity::High),
            ..Default::default()
        };
        let result = scan(&options);

        assert!(result
            .findings
            .iter()
            .all(|f| f.severity.rank() <= Severity::High.rank()));
    }

    #[test]
    fn test_scan_rule_selection() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".mcp.json"),
            r#"{"mcpServers": {"s": {"env": {"API_KEY": "sk-abcdefghij1234567890abcd"}}}}"#,
        )
        .unwrap();

        let options = ScanOptions {
            path: Some(dir.path().to_path_buf()),
            rules: vec!["transport-security".to_string()],
            ..Default::default()
        };
        let result = scan(&options);

        // the hardcoded secret is invisible to the transport rule
        assert!(result
            .findings
            .iter()
            .all(|f| f.rule_id == "transport-security"));
    }

    #[test]
    fn test_scan_survives_missing_custom_rules_file() {
        let dir = TempDir::new().unwrap();
        let options = ScanOptions {
            path: Some(dir.path().to_path_buf()),
            custom_rules: Some(dir.path().join("no-such-rules.yaml")),
            ..Default::default()
        };

        // degrades to zero custom rules, never panics
        let result = scan(&options);
        assert!(!result.timestamp.is_empty());
    }

    #[test]
    fn test_scan_runs_custom_rules() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".mcp.json"), r#"{"note": "forbidden-token"}"#).unwrap();
        let rules_path = dir.path().join("rules.yaml");
        fs::write(
            &rules_path,
            r#"
rules:
  - id: forbidden
    name: Forbidden marker
    severity: high
    patterns: ['forbidden-token']
"#,
        )
        .unwrap();

        let options = ScanOptions {
            path: Some(dir.path().to_path_buf()),
            custom_rules: Some(rules_path),
            ..Default::default()
        };
        let result = scan(&options);

        assert!(result.findings.iter().any(|f| f.rule_id == "forbidden"));
    }
}
