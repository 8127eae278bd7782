use crate::discovery::{ScanTarget, TargetKind};
use crate::rules::types::{Finding, Rule, Severity};
use serde_json::Value;

/// Checks Claude Code settings for tool grants broad enough to defeat the
/// permission system: wildcard tool lists, unrestricted Bash, and wildcard
/// permission patterns.
pub struct ToolPermissions;

impl Rule for ToolPermissions {
    fn id(&self) -> &str {
        "tool-permissions"
    }

    fn name(&self) -> &str {
        "Overly Permissive Tool Access"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn description(&self) -> &str {
        "Checks if Claude Code settings grant broad tool permissions without restrictions"
    }

    fn run(&self, targets: &[ScanTarget]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for target in targets {
            if target.kind != TargetKind::ClaudeSettings {
                continue;
            }
            let Some(content) = &target.content else {
                continue;
            };
            let Ok(settings) = serde_json::from_str::<Value>(content) else {
                continue;
            };

            if let Some(Value::Array(allowed)) = settings.get("allowedTools") {
                self.check_allowed_tools(allowed, target, &mut findings);
            }

            if let Some(Value::Array(allow)) = settings
                .get("permissions")
                .and_then(|p| p.get("allow"))
            {
                self.check_permission_patterns(allow, target, &mut findings);
            }
        }

        findings
    }
}

impl ToolPermissions {
    fn check_allowed_tools(
        &self,
        allowed: &[Value],
        target: &ScanTarget,
        findings: &mut Vec<Finding>,
    ) {
        for tool in allowed {
            let Some(tool) = tool.as_str() else { continue };
            if tool == "*" || tool == "all" {
                findings.push(
                    self.finding(
                        "Wildcard tool permissions granted",
                        format!(
                            "All tools are allowed via \"{tool}\" in settings. This bypasses all safety checks and allows unrestricted file system and command access."
                        ),
                        &target.path,
                        "Remove wildcard permissions and explicitly list only the tools you need.",
                    )
                    .with_severity(Severity::High),
                );
            }
        }

        let has_bash_wildcard = allowed
            .iter()
            .filter_map(|t| t.as_str())
            .any(|t| t == "Bash" || t == "Bash(*)");
        if has_bash_wildcard {
            findings.push(
                self.finding(
                    "Unrestricted Bash access allowed",
                    "Bash tool access is granted without command restrictions. Consider using pattern-based restrictions to limit which commands can be executed.",
                    &target.path,
                    "Use specific Bash patterns like \"Bash(npm test)\" or \"Bash(git *)\" to restrict allowed commands.",
                )
                .with_severity(Severity::Low)
                .with_evidence("Bash or Bash(*) in allowedTools"),
            );
        }
    }

    fn check_permission_patterns(
        &self,
        allow: &[Value],
        target: &ScanTarget,
        findings: &mut Vec<Finding>,
    ) {
        for pattern in allow {
            let Some(pattern) = pattern.as_str() else { continue };
            if pattern == "*" || pattern == "**" {
                findings.push(
                    self.finding(
                        "Wildcard permission pattern",
                        format!(
                            "Permission pattern \"{pattern}\" grants unrestricted access. All operations will be auto-approved without user confirmation."
                        ),
                        &target.path,
                        "Use specific permission patterns instead of wildcards.",
                    )
                    .with_severity(Severity::High),
                );
            }
        }
    }
}
